use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use toolgate_core::AppError;
use toolgate_db::SessionRepository;

use crate::auth::models::SessionContext;
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub session_repository: SessionRepository,
}

/// Resolve `Authorization: Bearer <token>` into a [`SessionContext`] before
/// any handler or policy check runs. Missing, malformed, unknown, and expired
/// credentials all produce 401.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match auth_state.session_repository.resolve(token).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(SessionContext {
                user_id: session.user_id,
                email: session.email,
            });
            next.run(request).await
        }
        Ok(None) => HttpAppError(AppError::Unauthorized(
            "Invalid or expired session token".to_string(),
        ))
        .into_response(),
        Err(err) => HttpAppError(err).into_response(),
    }
}
