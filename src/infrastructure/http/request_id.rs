use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Tags every request with a fresh id and echoes it in the response header,
/// so a degraded resolution (translation saved, audio missing) can be
/// matched to its warn-level log lines.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, header_value);
    }

    response
}

/// Extension value carrying the id assigned by [`request_id_middleware`].
#[derive(Debug, Clone)]
pub struct RequestId(pub String);
