//! Organization-scoped authorization helpers.
//!
//! Handlers call [`require_membership`] to resolve the caller's role, then
//! gate on a capability function from `toolgate_core::policy` via
//! [`require_capability`]. The Forbidden message is deliberately flat; it
//! never reveals which role would have been sufficient.

use toolgate_core::{models::Role, AppError};
use toolgate_db::MembershipRepository;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Resolve the caller's role in the organization, rejecting non-members.
pub async fn require_membership(
    memberships: &MembershipRepository,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Role, HttpAppError> {
    memberships
        .get_role(organization_id, user_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| {
            HttpAppError(AppError::Forbidden(
                "You do not have access to this organization".to_string(),
            ))
        })
}

/// Gate on a capability predicate evaluated against the caller's role.
pub fn require_capability(role: Role, allowed: fn(Role) -> bool) -> Result<(), HttpAppError> {
    if allowed(role) {
        Ok(())
    } else {
        Err(HttpAppError(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_core::policy;

    #[test]
    fn test_member_is_rejected_for_admin_capability() {
        let err = require_capability(Role::Member, policy::can_manage_tools).unwrap_err();
        match err.0 {
            AppError::Forbidden(msg) => {
                assert!(!msg.contains("ADMIN"));
                assert!(!msg.contains("OWNER"));
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_passes_admin_capability() {
        assert!(require_capability(Role::Admin, policy::can_manage_tools).is_ok());
    }
}
