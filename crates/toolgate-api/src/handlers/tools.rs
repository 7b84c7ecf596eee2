//! Tool registry handlers
//!
//! Create, list, get, patch, and archive tools. A tool is created together
//! with its three access tiers; archiving is a soft delete so historical
//! access requests keep resolving.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use toolgate_core::models::{actions, Tool, ToolAccessLevel, ToolStatus};
use toolgate_core::{policy, AppError, CapacityReport};
use toolgate_db::ToolPatch;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::authz::{require_capability, require_membership};
use crate::auth::SessionContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateToolRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateToolRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub category: Option<String>,
    pub status: Option<ToolStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ListToolsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// Tool together with its access tiers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ToolResponse {
    #[serde(flatten)]
    pub tool: Tool,
    pub access_levels: Vec<ToolAccessLevel>,
}

/// List the organization's tools
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/tools",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("include_archived" = Option<bool>, Query, description = "Include archived tools")
    ),
    responses((status = 200, description = "Tools")),
    tag = "tools"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn list_tools(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
    Query(query): Query<ListToolsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;

    let tools = state
        .db
        .tool_repository
        .list(organization_id, query.include_archived)
        .await?;

    Ok(Json(tools))
}

/// Register a tool with its three access tiers
#[utoipa::path(
    post,
    path = "/api/organizations/{organization_id}/tools",
    params(("organization_id" = Uuid, Path, description = "Organization id")),
    request_body = CreateToolRequest,
    responses(
        (status = 201, description = "Tool created", body = ToolResponse),
        (status = 400, description = "Tool limit reached or invalid input"),
        (status = 403, description = "Requires admin or owner")
    ),
    tag = "tools"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn create_tool(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path(organization_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateToolRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_manage_tools)?;

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
    if !capacity.can_add_tool {
        return Err(AppError::LimitReached {
            resource: "Tool".to_string(),
            used: capacity.current_tools,
            limit: capacity.limits.tools,
        }
        .into());
    }

    let (tool, access_levels) = state
        .db
        .tool_repository
        .create(
            organization_id,
            request.name.trim(),
            request.url.as_deref(),
            request.description.as_deref(),
            request.category.as_deref(),
        )
        .await?;

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        actions::TOOL_CREATED,
        "tool",
        Some(tool.id),
        Some(serde_json::json!({ "name": tool.name })),
    );

    Ok((
        StatusCode::CREATED,
        Json(ToolResponse {
            tool,
            access_levels,
        }),
    ))
}

/// Get a tool with its access tiers
#[utoipa::path(
    get,
    path = "/api/organizations/{organization_id}/tools/{tool_id}",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("tool_id" = Uuid, Path, description = "Tool id")
    ),
    responses(
        (status = 200, description = "Tool", body = ToolResponse),
        (status = 404, description = "Unknown tool")
    ),
    tag = "tools"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn get_tool(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((organization_id, tool_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;

    let tool = state
        .db
        .tool_repository
        .get(organization_id, tool_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tool not found".to_string()))?;
    let access_levels = state.db.tool_repository.get_levels(tool.id).await?;

    Ok(Json(ToolResponse {
        tool,
        access_levels,
    }))
}

/// Patch a tool; only supplied fields change
#[utoipa::path(
    patch,
    path = "/api/organizations/{organization_id}/tools/{tool_id}",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("tool_id" = Uuid, Path, description = "Tool id")
    ),
    request_body = UpdateToolRequest,
    responses(
        (status = 200, description = "Updated tool"),
        (status = 400, description = "Empty patch or invalid input"),
        (status = 403, description = "Requires admin or owner"),
        (status = 404, description = "Unknown tool")
    ),
    tag = "tools"
)]
#[tracing::instrument(skip(state, ctx, request))]
pub async fn update_tool(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((organization_id, tool_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UpdateToolRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_manage_tools)?;

    let patch = ToolPatch {
        name: request.name,
        url: request.url,
        description: request.description,
        category: request.category,
        status: request.status,
    };
    let changed_fields = patch.changed_fields();

    let tool = state
        .db
        .tool_repository
        .update(organization_id, tool_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Tool not found".to_string()))?;

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        actions::TOOL_UPDATED,
        "tool",
        Some(tool.id),
        Some(serde_json::json!({ "changed_fields": changed_fields })),
    );

    Ok(Json(tool))
}

/// Archive a tool (soft delete)
#[utoipa::path(
    delete,
    path = "/api/organizations/{organization_id}/tools/{tool_id}",
    params(
        ("organization_id" = Uuid, Path, description = "Organization id"),
        ("tool_id" = Uuid, Path, description = "Tool id")
    ),
    responses(
        (status = 200, description = "Tool archived"),
        (status = 403, description = "Requires admin or owner"),
        (status = 404, description = "Unknown or already archived tool")
    ),
    tag = "tools"
)]
#[tracing::instrument(skip(state, ctx))]
pub async fn archive_tool(
    State(state): State<Arc<AppState>>,
    ctx: SessionContext,
    Path((organization_id, tool_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let role =
        require_membership(&state.db.membership_repository, organization_id, ctx.user_id).await?;
    require_capability(role, policy::can_manage_tools)?;

    let archived = state
        .db
        .tool_repository
        .archive(organization_id, tool_id)
        .await?;
    if !archived {
        return Err(AppError::NotFound("Tool not found".to_string()).into());
    }

    state.audit.record(
        organization_id,
        Some(ctx.user_id),
        actions::TOOL_ARCHIVED,
        "tool",
        Some(tool_id),
        None,
    );

    #[derive(serde::Serialize)]
    struct ArchiveResponse {
        message: &'static str,
        id: Uuid,
    }

    Ok(Json(ArchiveResponse {
        message: "Tool archived",
        id: tool_id,
    }))
}
