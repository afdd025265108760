//! Business operations shared by the HTML screens, the JSON API and the
//! scan station.

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::variant::WorkflowVariant;
use crate::services::registry::WorkstationKey;

pub mod dispatch_history;
pub mod registry;
pub mod workflow;

pub use crate::domain::errors::{WorkflowError, WorkflowResult};

/// Resolves the workstation of an authenticated operator.
pub fn authorize(
    user: &AuthenticatedUser,
    variant: WorkflowVariant,
) -> WorkflowResult<WorkstationKey> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(WorkflowError::Unauthorized);
    }
    Ok(WorkstationKey::new(user.sub.clone(), variant))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn operator(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "7".to_string(),
            email: "operator@example.com".to_string(),
            hub_id: 1,
            name: "Operator".to_string(),
            roles: roles.iter().map(|role| role.to_string()).collect(),
            exp: 0,
        }
    }

    #[test]
    fn authorize_requires_dispatch_role() {
        let result = authorize(&operator(&["crm"]), WorkflowVariant::Pick);
        assert_eq!(result.unwrap_err(), WorkflowError::Unauthorized);

        let key = authorize(&operator(&[SERVICE_ACCESS_ROLE]), WorkflowVariant::Load).unwrap();
        assert_eq!(key, WorkstationKey::new("7", WorkflowVariant::Load));
    }
}
