use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe. Public; does not touch the database.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is alive", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
