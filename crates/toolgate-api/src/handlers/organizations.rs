//! Organization handlers
//!
//! List/create organizations and view an organization with its members.
//! Creation provisions the OWNER membership and the FREE subscription in one
//! transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use toolgate_core::models::actions;
use toolgate_core::{policy, validation, AppError};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::authz::{require_capability, require_membership};
use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub slug: String,
}

/// List organizations the caller belongs to
#[utoipa::path(
    get,
    path = "/api/organizations",
    responses((status = 200, description = "Caller's organizations")),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state
        .db
        .organization_repository
        .list_for_user(ctx.user_id)
        .await?;

    Ok(Json(organizations))
}

/// Create an organization; the caller becomes OWNER
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created"),
        (status = 400, description = "Invalid name or slug"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validation::validate_slug(&request.slug).map_err(AppError::InvalidInput)?;

    let organization = state
        .db
        .organization_repository
        .create(request.name.trim(), &request.slug, ctx.user_id)
        .await?;

    state.audit.record(
        organization.id,
        Some(ctx.user_id),
        actions::ORGANIZATION_CREATED,
        "organization",
        Some(organization.id),
        Some(serde_json::json!({ "name": organization.name, "slug": organization.slug })),
    );

    Ok((StatusCode::CREATED, Json(organization)))
}

/// Get one organization the caller belongs to
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization"),
        (status = 403, description = "Not a member"),
        (status = 404, description = "Unknown organization")
    ),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;

    let organization = state
        .db
        .organization_repository
        .get(organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(organization))
}

/// List the organization's members with their profiles
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/members",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Members"),
        (status = 403, description = "Requires admin or owner")
    ),
    tag = "organizations"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_view_members)?;

    let members = state
        .db
        .membership_repository
        .list_with_profiles(organization_id)
        .await?;

    Ok(Json(members))
}
