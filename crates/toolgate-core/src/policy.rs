//! Authorization policy
//!
//! Pure functions answering "may this role do X" and "does this organization
//! have spare capacity". Every handler goes through the capability functions
//! here; there are no inline role-list comparisons anywhere else, so an
//! "admin or owner" check has exactly one shape in the codebase.
//!
//! Role comparisons are exact-match against the closed enum. OWNER does not
//! implicitly satisfy a check unless the capability function lists it.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Role, Subscription};

/// May the role create, update, or archive tools.
pub fn can_manage_tools(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// May the role create, list, or cancel invitations for the organization.
pub fn can_manage_invitations(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// May the role approve, reject, or revoke access requests.
pub fn can_review_requests(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// May the role list the organization's members.
pub fn can_view_members(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// May the role read the organization's audit trail.
pub fn can_view_audit_log(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Owner)
}

/// May the role file access requests. Any member can.
pub fn can_request_access(role: Role) -> bool {
    matches!(role, Role::Owner | Role::Admin | Role::Member)
}

/// Subscription caps echoed back to callers alongside a capacity report.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct CapacityLimits {
    pub users: i64,
    pub tools: i64,
}

/// Advisory capacity snapshot for an organization.
///
/// Used by callers to reject creation with a descriptive error before
/// attempting the mutation. The check-then-insert pair is not atomic, so two
/// concurrent creators can both pass and transiently exceed a limit by one;
/// this is an accepted soft cap, not an invariant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CapacityReport {
    pub can_add_member: bool,
    pub can_add_tool: bool,
    pub current_members: i64,
    pub current_tools: i64,
    pub limits: CapacityLimits,
}

impl CapacityReport {
    /// Evaluate live counts of non-deleted members/tools against the
    /// subscription caps.
    pub fn evaluate(subscription: &Subscription, current_members: i64, current_tools: i64) -> Self {
        CapacityReport {
            can_add_member: current_members < subscription.user_limit,
            can_add_tool: current_tools < subscription.tool_limit,
            current_members,
            current_tools,
            limits: CapacityLimits {
                users: subscription.user_limit,
                tools: subscription.tool_limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionPlan;
    use chrono::Utc;
    use uuid::Uuid;

    fn subscription(user_limit: i64, tool_limit: i64) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            plan: SubscriptionPlan::Free,
            user_limit,
            tool_limit,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_member_cannot_use_admin_capabilities() {
        assert!(!can_manage_tools(Role::Member));
        assert!(!can_manage_invitations(Role::Member));
        assert!(!can_review_requests(Role::Member));
        assert!(!can_view_members(Role::Member));
        assert!(!can_view_audit_log(Role::Member));
    }

    #[test]
    fn test_admin_and_owner_hold_management_capabilities() {
        for role in [Role::Admin, Role::Owner] {
            assert!(can_manage_tools(role));
            assert!(can_manage_invitations(role));
            assert!(can_review_requests(role));
            assert!(can_view_members(role));
            assert!(can_view_audit_log(role));
        }
    }

    #[test]
    fn test_every_role_can_request_access() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert!(can_request_access(role));
        }
    }

    #[test]
    fn test_capacity_blocks_at_limit() {
        let sub = subscription(5, 10);
        let report = CapacityReport::evaluate(&sub, 5, 3);
        assert!(!report.can_add_member);
        assert!(report.can_add_tool);
        assert_eq!(report.current_members, 5);
        assert_eq!(report.limits.users, 5);
    }

    #[test]
    fn test_capacity_allows_below_limit() {
        let sub = subscription(5, 10);
        let report = CapacityReport::evaluate(&sub, 4, 10);
        assert!(report.can_add_member);
        assert!(!report.can_add_tool);
        assert_eq!(report.limits.tools, 10);
    }
}
