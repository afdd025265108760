//! Screens of the pick, load and pick-load workflows.

use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, redirect, render_template};
use tera::Tera;

use crate::domain::types::UnitId;
use crate::domain::variant::WorkflowVariant;
use crate::dto::workflow::SubmitReport;
use crate::forms::FormError;
use crate::forms::workflow::{ScanForm, ScanPayload, SelectOrderForm, SelectOrderPayload};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{error_redirect, workflow_path, workstation};
use crate::services::registry::SessionRegistry;
use crate::services::workflow as workflow_service;

#[get("/{variant}")]
/// Show the workflow screen with the selected order, its lots and the scans so far.
pub async fn show_workflow(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    registry: web::Data<SessionRegistry>,
    flash_messages: IncomingFlashMessages,
    common_config: web::Data<CommonServerConfig>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let summary = workflow_service::load_session_summary(registry.get_ref(), &key);

    let mut context = base_context(
        &flash_messages,
        &user,
        variant.as_str(),
        &common_config.auth_service_url,
    );
    context.insert("variant", &variant);
    context.insert("title", variant.title());
    context.insert("scan_field_count", &variant.scan_field_count());
    context.insert("tracks_weights", &variant.tracks_lot_weights());
    context.insert("summary", &summary);
    context.insert("lot_advance_notice_ms", &server_config.lot_advance_notice_ms);

    render_template(&tera, "workflow/index.html", &context)
}

#[post("/{variant}/order")]
/// Validate the dispatch order number and start a session for it.
pub async fn select_order(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<SessionRegistry>,
    form: web::Form<SelectOrderForm>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let payload = match SelectOrderPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(format!("Invalid dispatch order: {err}")).send();
            return redirect(&workflow_path(variant));
        }
    };

    match workflow_service::validate_dispatch_order(
        repo.get_ref(),
        registry.get_ref(),
        &key,
        payload.dispatch_order_id.as_str(),
    ) {
        Ok(summary) => {
            FlashMessage::info(format!(
                "Dispatch order {} selected with {} lots.",
                payload.dispatch_order_id,
                summary.lots.len()
            ))
            .send();
            redirect(&workflow_path(variant))
        }
        Err(err) => error_redirect(err, variant),
    }
}

#[post("/{variant}/order/reset")]
/// Drop the selected order so another one can be entered.
pub async fn reset_order(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    match workflow_service::reset_dispatch_order(registry.get_ref(), &key) {
        Ok(()) => redirect(&workflow_path(variant)),
        Err(err) => error_redirect(err, variant),
    }
}

#[post("/{variant}/scan")]
/// Accept one scanned label.
pub async fn scan_roll(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<SessionRegistry>,
    form: web::Form<ScanForm>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let payload = match ScanPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(FormError::EmptyScan) => return redirect(&workflow_path(variant)),
        Err(err) => {
            FlashMessage::error(format!("Invalid scan: {err}")).send();
            return redirect(&workflow_path(variant));
        }
    };

    match workflow_service::scan_roll(repo.get_ref(), registry.get_ref(), &key, &payload.code) {
        Ok(outcome) => {
            if let Some(completion) = outcome.completion {
                let message = match completion.next_lot_no {
                    Some(next) => format!(
                        "Lot {} is complete. Continue with lot {next}.",
                        completion.lot_no
                    ),
                    None => format!(
                        "Lot {} is complete. All lots of the order are scanned.",
                        completion.lot_no
                    ),
                };
                FlashMessage::success(message).send();
            }
            redirect(&workflow_path(variant))
        }
        Err(err) => error_redirect(err, variant),
    }
}

#[post("/{variant}/units/{unit_id}/remove")]
/// Remove a scanned unit from the list.
pub async fn remove_unit(
    path: web::Path<(WorkflowVariant, String)>,
    user: AuthenticatedUser,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let (variant, unit_id) = path.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    let unit_id = match unit_id.parse::<UnitId>() {
        Ok(unit_id) => unit_id,
        Err(_) => {
            FlashMessage::error(FormError::InvalidUnitId.to_string()).send();
            return redirect(&workflow_path(variant));
        }
    };

    if let Some(unit) = workflow_service::remove_unit(registry.get_ref(), &key, unit_id) {
        FlashMessage::info(format!(
            "Roll {} removed from lot {}.",
            unit.fg_roll_no, unit.lot_no
        ))
        .send();
    }
    redirect(&workflow_path(variant))
}

#[post("/{variant}/next-lot")]
/// Move to the next lot once the active one is full.
pub async fn next_lot(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    match workflow_service::advance_lot(registry.get_ref(), &key) {
        Ok(_) => redirect(&workflow_path(variant)),
        Err(err) => error_redirect(err, variant),
    }
}

#[post("/{variant}/submit")]
/// Persist the scanned rolls.
pub async fn submit(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    let variant = variant.into_inner();
    let key = match workstation(&user, variant) {
        Ok(key) => key,
        Err(response) => return response,
    };

    match workflow_service::submit_scans(repo.get_ref(), registry.get_ref(), &key) {
        Ok(report) => {
            flash_report(&report);
            redirect(&workflow_path(variant))
        }
        Err(err) => error_redirect(err, variant),
    }
}

fn flash_report(report: &SubmitReport) {
    if report.is_complete() {
        FlashMessage::success(format!(
            "{} rolls submitted for dispatch order {}.",
            report.submitted, report.dispatch_order_id
        ))
        .send();
        return;
    }

    for failure in &report.failures {
        let message = match &failure.fg_roll_no {
            Some(roll_no) => format!(
                "Roll {roll_no} of lot {} was not saved: {}",
                failure.lot_no, failure.message
            ),
            None => format!(
                "Weights of lot {} were not saved: {}",
                failure.lot_no, failure.message
            ),
        };
        FlashMessage::error(message).send();
    }
    FlashMessage::warning(format!(
        "{} rolls submitted for dispatch order {} with {} errors.",
        report.submitted,
        report.dispatch_order_id,
        report.failures.len()
    ))
    .send();
}
