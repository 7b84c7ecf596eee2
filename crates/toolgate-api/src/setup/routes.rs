//! Route configuration and setup.

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use toolgate_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api_path;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::middleware::security_headers::{security_headers_middleware, SecurityHeadersConfig};
use crate::state::AppState;

const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        session_repository: state.db.session_repository.clone(),
    };

    let public_routes = public_routes();
    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new(api_path!("/openapi.json"))
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(api_path!("/health"), get(handlers::health::health_check))
        .route(
            api_path!("/openapi.json"),
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Organizations
        .route(
            api_path!("/organizations"),
            get(handlers::organizations::list_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            api_path!("/organizations/{organization_id}"),
            get(handlers::organizations::get_organization),
        )
        .route(
            api_path!("/organizations/{organization_id}/members"),
            get(handlers::organizations::list_members),
        )
        // Invitations (admin side)
        .route(
            api_path!("/organizations/{organization_id}/invitations"),
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        // Invitations (invitee side)
        .route(
            api_path!("/invitations"),
            get(handlers::invitations::list_user_invitations),
        )
        .route(
            api_path!("/invitations/accept"),
            post(handlers::invitations::accept_invitation),
        )
        .route(
            api_path!("/invitations/{invitation_id}"),
            delete(handlers::invitations::decline_invitation),
        )
        // Tools
        .route(
            api_path!("/organizations/{organization_id}/tools"),
            get(handlers::tools::list_tools).post(handlers::tools::create_tool),
        )
        .route(
            api_path!("/organizations/{organization_id}/tools/{tool_id}"),
            get(handlers::tools::get_tool)
                .patch(handlers::tools::update_tool)
                .delete(handlers::tools::archive_tool),
        )
        // Access requests
        .route(
            api_path!("/organizations/{organization_id}/access-requests"),
            get(handlers::access_requests::list_access_requests)
                .post(handlers::access_requests::create_access_request),
        )
        .route(
            api_path!("/organizations/{organization_id}/access-requests/{request_id}"),
            patch(handlers::access_requests::review_access_request),
        )
        // Audit trail
        .route(
            api_path!("/organizations/{organization_id}/audit-logs"),
            get(handlers::audit_logs::list_audit_logs),
        )
}
