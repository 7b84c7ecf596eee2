//! Access request handlers
//!
//! Members file requests for an access tier on a tool; admins and owners
//! review them. The review transition is a conditional update so concurrent
//! reviewers cannot both win.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use toolgate_core::models::{actions, AccessLevel, RequestStatus};
use toolgate_core::{policy, AppError};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::authz::{require_capability, require_membership};
use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccessRequestRequest {
    pub tool_id: Uuid,
    pub access_level: AccessLevel,
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewAccessRequestRequest {
    pub status: RequestStatus,
}

fn audit_action_for(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Approved => actions::ACCESS_REQUEST_APPROVED,
        RequestStatus::Rejected => actions::ACCESS_REQUEST_REJECTED,
        RequestStatus::Revoked => actions::ACCESS_REQUEST_REVOKED,
        RequestStatus::Pending => actions::ACCESS_REQUEST_CREATED,
    }
}

/// List access requests: reviewers see all, members see their own
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/access-requests",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    responses((status = 200, description = "Access requests")),
    tag = "access-requests"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_access_requests(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;

    let requests = if policy::can_review_requests(role) {
        state
            .db
            .access_request_repository
            .list_for_org(organization_id)
            .await?
    } else {
        state
            .db
            .access_request_repository
            .list_for_user(organization_id, ctx.user_id)
            .await?
    };

    Ok(Json(requests))
}

/// File an access request for a tool
#[utoipa::path(
    post,
    path = "/api/organizations/{organization_id}/access-requests",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    request_body = CreateAccessRequestRequest,
    responses(
        (status = 201, description = "Request filed"),
        (status = 404, description = "Unknown or archived tool"),
        (status = 409, description = "A pending request already exists")
    ),
    tag = "access-requests"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_access_request(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateAccessRequestRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_request_access)?;

    let tool = state
        .db
        .tool_repository
        .get(organization_id, request.tool_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tool not found".to_string()))?;
    if tool.deleted_at.is_some() {
        return Err(AppError::NotFound("Tool not found".to_string()).into());
    }

    let access_request = state
        .db
        .access_request_repository
        .create(
            organization_id,
            tool.id,
            ctx.user_id,
            request.access_level,
            request.reason.as_deref(),
        )
        .await?;

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        actions::ACCESS_REQUEST_CREATED,
        "access_request",
        Some(access_request.id),
        Some(serde_json::json!({
            "tool_id": tool.id,
            "access_level": access_request.access_level,
            "reason": access_request.reason,
        })),
    );

    Ok((StatusCode::CREATED, Json(access_request)))
}

/// Review a request: approve, reject, or revoke
#[utoipa::path(
    patch,
    path = "/api/organizations/{organization_id}/access-requests/{request_id}",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("request_id" = Uuid, Path, description = "Access request id")
    ),
    request_body = ReviewAccessRequestRequest,
    responses(
        (status = 200, description = "Updated request"),
        (status = 400, description = "Invalid target status"),
        (status = 403, description = "Requires admin or owner"),
        (status = 404, description = "Unknown request"),
        (status = 409, description = "Request already left the reviewable state")
    ),
    tag = "access-requests"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn review_access_request(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((organization_id, request_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<ReviewAccessRequestRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_review_requests)?;

    let updated = state
        .db
        .access_request_repository
        .review(organization_id, request_id, request.status, ctx.user_id)
        .await?;

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        audit_action_for(updated.status),
        "access_request",
        Some(updated.id),
        Some(serde_json::json!({ "status": updated.status })),
    );

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_per_status() {
        assert_eq!(
            audit_action_for(RequestStatus::Approved),
            actions::ACCESS_REQUEST_APPROVED
        );
        assert_eq!(
            audit_action_for(RequestStatus::Rejected),
            actions::ACCESS_REQUEST_REJECTED
        );
        assert_eq!(
            audit_action_for(RequestStatus::Revoked),
            actions::ACCESS_REQUEST_REVOKED
        );
    }
}
