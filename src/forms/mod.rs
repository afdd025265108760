//! Form definitions backing the workflow routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod workflow;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid dispatch order number")]
    InvalidDispatchOrder,

    #[error("scanned label is empty")]
    EmptyScan,

    #[error("invalid unit id")]
    InvalidUnitId,
}
