use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{OrganizationSummary, ProfileSummary, Role};

/// Time-bounded, emailed token offering a role in an organization.
///
/// Consumed exactly once (accepted, which materializes a membership) or
/// deleted (declined). Unaccepted invitations are unique per
/// (organization, lower(email)).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invitation {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub role: Role,
    pub invited_by: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Case-insensitive match against the invitee's email.
    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Invitation joined with inviter profile (admin view of an organization's
/// outstanding invitations).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvitationDetails {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub inviter: Option<ProfileSummary>,
}

/// Invitation joined with organization and inviter (invitee's own view across
/// organizations).
///
/// Unlike the admin listing, this view carries the token: the invitee needs
/// it to accept.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInvitation {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub token: String,
    pub organization: OrganizationSummary,
    pub inviter: Option<ProfileSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(email: &str, expires_at: DateTime<Utc>) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            email: email.to_string(),
            role: Role::Member,
            invited_by: Uuid::new_v4(),
            token: "deadbeef".to_string(),
            expires_at,
            accepted_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let fresh = invitation("bob@acme.com", now + Duration::days(7));
        let stale = invitation("bob@acme.com", now - Duration::seconds(1));
        assert!(!fresh.is_expired(now));
        assert!(stale.is_expired(now));
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let now = Utc::now();
        let inv = invitation("User@Example.com", now + Duration::days(7));
        assert!(inv.is_addressed_to("user@example.com"));
        assert!(inv.is_addressed_to("USER@EXAMPLE.COM"));
        assert!(!inv.is_addressed_to("other@example.com"));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let now = Utc::now();
        let inv = invitation("bob@acme.com", now + Duration::days(7));
        let json = serde_json::to_value(&inv).expect("serialize");
        assert!(json.get("token").is_none());
        assert!(json.get("email").is_some());
    }

    #[test]
    fn test_invitee_view_carries_token() {
        let now = Utc::now();
        let inv = invitation("bob@acme.com", now + Duration::days(7));
        let view = UserInvitation {
            token: inv.token.clone(),
            organization: OrganizationSummary {
                id: inv.organization_id,
                name: "Acme".to_string(),
                slug: "acme".to_string(),
            },
            inviter: None,
            invitation: inv,
        };
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(
            json.get("token").and_then(|v| v.as_str()),
            Some("deadbeef")
        );
    }
}
