//! JSON endpoints used by scanner terminals and integrations.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;
use serde_json::json;

use crate::domain::variant::WorkflowVariant;
use crate::repository::DieselRepository;
use crate::services::registry::SessionRegistry;
use crate::services::{
    WorkflowError, authorize, dispatch_history as history_service, workflow as workflow_service,
};

#[derive(Deserialize)]
struct ApiV1ScanBody {
    code: String,
}

/// HTTP status matching a workflow error.
pub fn error_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Unauthorized => StatusCode::UNAUTHORIZED,
        WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::NoSession | WorkflowError::NoActiveLot | WorkflowError::Busy(_) => {
            StatusCode::CONFLICT
        }
        WorkflowError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
        WorkflowError::InvalidInput(_) | WorkflowError::MalformedInput(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(err: WorkflowError) -> HttpResponse {
    let status = error_status(&err);
    if status.is_server_error() {
        log::error!("API request failed: {err}");
    }
    HttpResponse::build(status).json(json!({ "error": err.to_string() }))
}

#[get("/v1/{variant}/session")]
pub async fn api_v1_session(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    registry: web::Data<SessionRegistry>,
) -> impl Responder {
    match authorize(&user, variant.into_inner()) {
        Ok(key) => {
            HttpResponse::Ok().json(workflow_service::load_session_summary(registry.get_ref(), &key))
        }
        Err(err) => error_response(err),
    }
}

#[post("/v1/{variant}/scan")]
pub async fn api_v1_scan(
    variant: web::Path<WorkflowVariant>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    registry: web::Data<SessionRegistry>,
    body: web::Json<ApiV1ScanBody>,
) -> impl Responder {
    let result = authorize(&user, variant.into_inner()).and_then(|key| {
        workflow_service::scan_roll(repo.get_ref(), registry.get_ref(), &key, &body.code)
    });

    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(err) => error_response(err),
    }
}

#[get("/v1/dispatch-orders/{order_id}/rolls")]
pub async fn api_v1_dispatch_rolls(
    order_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = authorize(&user, WorkflowVariant::Load)
        .and_then(|_| history_service::load_dispatch_history(repo.get_ref(), &order_id));

    match result {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(err) => error_response(err),
    }
}
