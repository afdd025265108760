//! HTTP handlers.
//!
//! HTML handlers turn every workflow error into a flash message and
//! redirect back to the workflow screen; API handlers answer with JSON.

use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::redirect;

use crate::domain::variant::WorkflowVariant;
use crate::services::registry::WorkstationKey;
use crate::services::{WorkflowError, authorize};

pub mod api;
pub mod main;
pub mod workflow;

/// Location of a variant's workflow screen.
pub fn workflow_path(variant: WorkflowVariant) -> String {
    format!("/{variant}")
}

/// Flashes the error and redirects to the matching screen.
pub fn error_redirect(err: WorkflowError, variant: WorkflowVariant) -> HttpResponse {
    match err {
        WorkflowError::Unauthorized => {
            FlashMessage::error("Access denied.").send();
            redirect("/na")
        }
        WorkflowError::NetworkFailure(_) => {
            log::error!("Workflow {variant} failed: {err}");
            FlashMessage::error(format!("{err}. Please try again.")).send();
            redirect(&workflow_path(variant))
        }
        err => {
            FlashMessage::warning(capitalize(&err.to_string())).send();
            redirect(&workflow_path(variant))
        }
    }
}

/// Resolves the operator's workstation or the response to send instead.
pub fn workstation(
    user: &AuthenticatedUser,
    variant: WorkflowVariant,
) -> Result<WorkstationKey, HttpResponse> {
    authorize(user, variant).map_err(|err| error_redirect(err, variant))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_paths_use_kebab_case() {
        assert_eq!(workflow_path(WorkflowVariant::PickLoad), "/pick-load");
        assert_eq!(workflow_path(WorkflowVariant::Load), "/load");
    }

    #[test]
    fn messages_start_with_a_capital() {
        assert_eq!(capitalize("lots not finished: L2"), "Lots not finished: L2");
        assert_eq!(capitalize(""), "");
    }
}
