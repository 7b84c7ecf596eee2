//! Audit trail listing for admins and owners.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use toolgate_core::policy;
use uuid::Uuid;

use crate::auth::authz::{require_capability, require_membership};
use crate::auth::SessionContext;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListAuditLogsQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// List the organization's audit trail, newest first
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/audit-logs",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Audit entries"),
        (status = 403, description = "Requires admin or owner")
    ),
    tag = "audit-logs"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_view_audit_log)?;

    let limit = query
        .limit
        .unwrap_or_else(|| state.config.audit_default_page_size())
        .clamp(1, 100);
    let offset = query.offset.max(0);

    let entries = state
        .db
        .audit_log_repository
        .list_for_org(organization_id, limit, offset)
        .await?;

    Ok(Json(entries))
}
