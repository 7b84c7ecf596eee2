//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use toolgate_core::models;

/// Returns the OpenAPI spec served at /api/openapi.json.
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toolgate API",
        version = "0.1.0",
        description = "Access governance for an organization's internal tools: tool registry with tiered access levels, access requests with admin review, email invitations, and a per-organization audit trail. All endpoints are under /api/."
    ),
    paths(
        // Health
        handlers::health::health_check,
        // Organizations
        handlers::organizations::list_organizations,
        handlers::organizations::create_organization,
        handlers::organizations::get_organization,
        handlers::organizations::list_members,
        // Invitations
        handlers::invitations::list_invitations,
        handlers::invitations::create_invitation,
        handlers::invitations::list_user_invitations,
        handlers::invitations::accept_invitation,
        handlers::invitations::decline_invitation,
        // Tools
        handlers::tools::list_tools,
        handlers::tools::create_tool,
        handlers::tools::get_tool,
        handlers::tools::update_tool,
        handlers::tools::archive_tool,
        // Access requests
        handlers::access_requests::list_access_requests,
        handlers::access_requests::create_access_request,
        handlers::access_requests::review_access_request,
        // Audit trail
        handlers::audit_logs::list_audit_logs,
    ),
    components(
        schemas(
            // Core models
            models::Organization,
            models::OrganizationSummary,
            models::Role,
            models::Membership,
            models::MemberDetails,
            models::ProfileSummary,
            models::SubscriptionPlan,
            models::Subscription,
            models::ToolStatus,
            models::AccessLevel,
            models::Tool,
            models::ToolAccessLevel,
            models::RequestStatus,
            models::AccessRequest,
            models::AccessRequestDetails,
            models::Invitation,
            models::InvitationDetails,
            models::UserInvitation,
            models::AuditLog,
            models::AuditLogDetails,
            // Request and response bodies
            handlers::health::HealthResponse,
            handlers::organizations::CreateOrganizationRequest,
            handlers::invitations::CreateInvitationRequest,
            handlers::invitations::CreatedInvitationResponse,
            handlers::invitations::AcceptInvitationRequest,
            handlers::tools::CreateToolRequest,
            handlers::tools::UpdateToolRequest,
            handlers::tools::ToolResponse,
            handlers::access_requests::CreateAccessRequestRequest,
            handlers::access_requests::ReviewAccessRequestRequest,
            // Errors
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness"),
        (name = "organizations", description = "Organizations and members"),
        (name = "invitations", description = "Invitation lifecycle"),
        (name = "tools", description = "Tool registry"),
        (name = "access-requests", description = "Access request workflow"),
        (name = "audit-logs", description = "Audit trail")
    )
)]
struct ApiDoc;
