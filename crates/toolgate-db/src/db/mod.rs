//! Database repositories for data access layer
//!
//! One repository per entity. Repositories own a pool handle, are cheap to
//! clone, and return `AppError`. Unique-constraint violations are translated
//! into `Conflict` here so handlers never see a raw driver error.

pub mod access_request;
pub mod audit_log;
pub mod invitation;
pub mod membership;
pub mod organization;
pub mod session;
pub mod subscription;
pub mod tool;

pub use access_request::AccessRequestRepository;
pub use audit_log::AuditLogRepository;
pub use invitation::InvitationRepository;
pub use membership::MembershipRepository;
pub use organization::OrganizationRepository;
pub use session::{ResolvedSession, SessionRepository};
pub use subscription::SubscriptionRepository;
pub use tool::ToolRepository;

use toolgate_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Client-safe message for a violated unique constraint.
pub(crate) fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "organizations_slug_key" => "An organization with this slug already exists",
        "memberships_org_user_active_idx" => "User is already a member of this organization",
        "access_requests_one_pending_idx" => {
            "A pending request for this tool already exists"
        }
        "invitations_org_email_open_idx" => {
            "An open invitation for this email already exists in this organization"
        }
        "invitations_token_key" => "Invitation token collision, retry the operation",
        _ => "Resource already exists",
    }
}

/// Translate a driver error, mapping unique violations to `Conflict` and
/// everything else through the standard `Database` path.
pub(crate) fn translate_db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or_default();
            return AppError::Conflict(conflict_message(constraint).to_string());
        }
    }
    AppError::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_constraints_have_specific_messages() {
        assert!(conflict_message("organizations_slug_key").contains("slug"));
        assert!(conflict_message("memberships_org_user_active_idx").contains("member"));
        assert!(conflict_message("access_requests_one_pending_idx").contains("pending"));
        assert!(conflict_message("invitations_org_email_open_idx").contains("invitation"));
    }

    #[test]
    fn test_unknown_constraint_gets_generic_message() {
        assert_eq!(conflict_message("something_else"), "Resource already exists");
    }
}
