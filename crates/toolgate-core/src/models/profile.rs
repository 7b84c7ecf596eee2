use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Compact profile used when joining requester/reviewer/inviter information
/// into list responses. Profiles are owned by the external auth collaborator;
/// this service only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProfileSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}
