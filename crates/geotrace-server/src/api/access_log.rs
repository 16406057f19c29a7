//! Request correlation and access logging.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied id that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 128;

fn caller_request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
}

/// Tag the request with an id (the caller's, or a fresh uuid), run it inside
/// an `http` span and log one line with its status and latency. The id is
/// echoed on the response.
pub async fn access_log(mut request: Request, next: Next) -> Response {
    let request_id = caller_request_id(request.headers())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("http", request_id = %request_id, %method, %path);
    let started = Instant::now();

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    span.in_scope(|| {
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), elapsed_ms, "request failed");
        } else if path == "/health" {
            tracing::trace!(status = status.as_u16(), elapsed_ms, "health check");
        } else {
            tracing::info!(status = status.as_u16(), elapsed_ms, "request served");
        }
    });

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
