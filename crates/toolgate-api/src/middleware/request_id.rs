use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

/// Request id carried through extensions and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub Uuid);

/// Assigns a fresh id to every request and sets the `x-request-id` response
/// header so clients can quote it in bug reports.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4());
    let id_string = request_id.0.to_string();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(header_value) = HeaderValue::from_str(&id_string) {
        response.headers_mut().insert("x-request-id", header_value);
    }
    response
}
