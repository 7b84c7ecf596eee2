use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use uuid::Uuid;

/// Calling principal resolved from the session token and stored in request
/// extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing session context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_SESSION_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check the session token".to_string()),
                    }),
                )
            })
    }
}
