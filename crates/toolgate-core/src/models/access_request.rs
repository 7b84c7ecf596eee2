use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AccessLevel, ProfileSummary};

/// Status of an access request.
///
/// PENDING is the only non-terminal state a request is created in; APPROVED
/// additionally allows a later REVOKED transition. REJECTED and REVOKED are
/// dead ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "request_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Revoked,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Revoked,
    ];

    /// Only PENDING -> APPROVED/REJECTED and APPROVED -> REVOKED are legal;
    /// terminal statuses can never be left by a review.
    pub fn can_transition_to(&self, new: RequestStatus) -> bool {
        matches!(
            (self, new),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Revoked)
        )
    }

    /// The status a request must currently hold for a review to move it to
    /// `self`. None means `self` is not a legal review target.
    pub fn required_predecessor(self) -> Option<RequestStatus> {
        RequestStatus::ALL
            .into_iter()
            .find(|from| from.can_transition_to(self))
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "PENDING"),
            RequestStatus::Approved => write!(f, "APPROVED"),
            RequestStatus::Rejected => write!(f, "REJECTED"),
            RequestStatus::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// A member's request for an access level on a tool, subject to admin review.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AccessRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub tool_id: Uuid,
    pub user_id: Uuid,
    pub access_level: AccessLevel,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Access request joined with the tool name and requester/reviewer profile
/// summaries, as returned by list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessRequestDetails {
    #[serde(flatten)]
    pub request: AccessRequest,
    pub tool_name: String,
    pub requester: Option<ProfileSummary>,
    pub reviewer: Option<ProfileSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Revoked));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn test_revoke_only_from_approved() {
        assert!(RequestStatus::Approved.can_transition_to(RequestStatus::Revoked));
        assert!(!RequestStatus::Rejected.can_transition_to(RequestStatus::Revoked));
        assert!(!RequestStatus::Revoked.can_transition_to(RequestStatus::Revoked));
    }

    #[test]
    fn test_terminal_states_are_dead_ends() {
        for terminal in [RequestStatus::Rejected, RequestStatus::Revoked] {
            for target in RequestStatus::ALL {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_required_predecessor_follows_transitions() {
        assert_eq!(
            RequestStatus::Approved.required_predecessor(),
            Some(RequestStatus::Pending)
        );
        assert_eq!(
            RequestStatus::Rejected.required_predecessor(),
            Some(RequestStatus::Pending)
        );
        assert_eq!(
            RequestStatus::Revoked.required_predecessor(),
            Some(RequestStatus::Approved)
        );
        assert_eq!(RequestStatus::Pending.required_predecessor(), None);
    }
}
