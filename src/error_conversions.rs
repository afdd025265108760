//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository error types, so the
//! conversions live here where both sides are visible.

use crate::domain::errors::WorkflowError;
use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for WorkflowError {
    fn from(val: TypeConstraintError) -> Self {
        WorkflowError::InvalidInput(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(val: RepositoryError) -> Self {
        WorkflowError::NetworkFailure(val.to_string())
    }
}
