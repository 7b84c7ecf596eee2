//! Invitation handlers
//!
//! Admin-facing create/list under an organization, plus invitee-facing
//! list/accept/decline. Accepting materializes the membership and stamps the
//! invitation in one transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use toolgate_core::models::{actions, Invitation, Role};
use toolgate_core::{policy, validation, AppError, CapacityReport};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::authz::{require_capability, require_membership};
use crate::auth::token::generate_invitation_token;
use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvitationRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default = "default_invitation_role")]
    pub role: Role,
}

fn default_invitation_role() -> Role {
    Role::Member
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

/// Create response. Carries the token so the admin can hand it to the
/// invitee out of band; listings omit it.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedInvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub token: String,
}

/// List the organization's open invitations
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/invitations",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Open invitations"),
        (status = 403, description = "Requires admin or owner")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_manage_invitations)?;

    let invitations = state
        .db
        .invitation_repository
        .list_for_org(organization_id)
        .await?;

    Ok(Json(invitations))
}

/// Invite an email address into the organization
#[utoipa::path(
    post,
    path = "/api/organizations/{organization_id}/invitations",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created", body = CreatedInvitationResponse),
        (status = 400, description = "Member limit reached or invalid email"),
        (status = 403, description = "Requires admin or owner"),
        (status = 409, description = "Already a member or already invited")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_manage_invitations)?;

    let subscription = state
        .db
        .subscription_repository
        .get_for_organization(organization_id)
        .await?
        .ok_or_else(|| AppError::Internal("Organization has no subscription".to_string()))?;
    let member_count = state
        .db
        .membership_repository
        .count_active(organization_id)
        .await?;
    let tool_count = state.db.tool_repository.count_active(organization_id).await?;
    let capacity = CapacityReport::evaluate(&subscription, member_count, tool_count);
    if !capacity.can_add_member {
        return Err(AppError::LimitReached {
            resource: "Member".to_string(),
            used: capacity.current_members,
            limit: capacity.limits.users,
        }
        .into());
    }

    let email = validation::normalize_email(&request.email);
    if state
        .db
        .membership_repository
        .email_is_member(organization_id, &email)
        .await?
    {
        return Err(AppError::Conflict(
            "User is already a member of this organization".to_string(),
        )
        .into());
    }

    let token = generate_invitation_token();
    let expires_at = Utc::now() + Duration::days(state.config.invitation_expires_days());

    let invitation = state
        .db
        .invitation_repository
        .create(
            organization_id,
            &email,
            request.role,
            ctx.user_id,
            &token,
            expires_at,
        )
        .await?;

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        actions::INVITATION_CREATED,
        "invitation",
        Some(invitation.id),
        Some(serde_json::json!({
            "email": invitation.email,
            "role": invitation.role.to_string(),
        })),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedInvitationResponse { token, invitation }),
    ))
}

/// List pending invitations addressed to the caller
#[utoipa::path(
    get,
    path = "/api/invitations",
    responses((status = 200, description = "Caller's pending invitations")),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_user_invitations(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let invitations = state
        .db
        .invitation_repository
        .list_for_email(&ctx.email)
        .await?;

    Ok(Json(invitations))
}

/// Accept an invitation by token; returns the joined organization
#[utoipa::path(
    post,
    path = "/api/invitations/accept",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Joined the organization"),
        (status = 400, description = "Expired or addressed to a different email"),
        (status = 404, description = "Unknown token"),
        (status = 409, description = "Already a member")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let invitation = state
        .db
        .invitation_repository
        .get_by_token(&request.token)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    if invitation.is_expired(Utc::now()) {
        return Err(AppError::BadRequest("Invitation has expired".to_string()).into());
    }
    if !invitation.is_addressed_to(&ctx.email) {
        return Err(AppError::BadRequest(
            "Invitation was sent to a different email address".to_string(),
        )
        .into());
    }

    let existing_role = state
        .db
        .membership_repository
        .get_role(invitation.organization_id, ctx.user_id)
        .await?;
    if existing_role.is_some() {
        // Stale invitation: the invitee joined through another path. Remove it
        // so it stops showing up in their pending list.
        state.db.invitation_repository.delete(invitation.id).await?;
        return Err(AppError::Conflict(
            "You are already a member of this organization".to_string(),
        )
        .into());
    }

    state
        .db
        .invitation_repository
        .accept(
            invitation.id,
            invitation.organization_id,
            ctx.user_id,
            invitation.role,
        )
        .await?;

    state.audit.record(
        invitation.organization_id,
        Some(ctx.user_id),
        actions::INVITATION_ACCEPTED,
        "invitation",
        Some(invitation.id),
        Some(serde_json::json!({ "role": invitation.role.to_string() })),
    );

    let organization = state
        .db
        .organization_repository
        .get(invitation.organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(organization))
}

/// Decline an invitation addressed to the caller
#[utoipa::path(
    delete,
    path = "/api/invitations/{invitation_id}",
    params(("invitation_id" = Uuid, Path, description = "Invitation id")),
    responses(
        (status = 200, description = "Invitation declined"),
        (status = 404, description = "No matching invitation for this caller")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn decline_invitation(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(invitation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let invitation = state
        .db
        .invitation_repository
        .delete_addressed_to(invitation_id, &ctx.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    state.audit.record(
        invitation.organization_id,
        Some(ctx.user_id),
        actions::INVITATION_DECLINED,
        "invitation",
        Some(invitation.id),
        None,
    );

    #[derive(serde::Serialize)]
    struct DeclineResponse {
        message: &'static str,
        id: Uuid,
    }

    Ok(Json(DeclineResponse {
        message: "Invitation declined",
        id: invitation_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The create response must carry the token: without it the admin has
    /// nothing to hand the invitee, and the accept flow cannot be driven.
    #[test]
    fn test_create_response_exposes_token() {
        let now = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            email: "bob@acme.com".to_string(),
            role: Role::Member,
            invited_by: Uuid::new_v4(),
            token: "cafebabe".to_string(),
            expires_at: now + Duration::days(7),
            accepted_at: None,
            created_at: now,
        };
        let response = CreatedInvitationResponse {
            token: invitation.token.clone(),
            invitation,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("token").and_then(|v| v.as_str()), Some("cafebabe"));
        assert!(json.get("email").is_some());
    }
}
