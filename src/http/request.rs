//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) for log correlation
//! - Read exactly `Content-Length` body bytes from the client
//! - Build the outbound request for the upstream
//!
//! # Design Decisions
//! - Request ID lives on the tracing span only; it is not sent upstream
//! - The outbound request uses the client's method, never its HTTP version
//! - Original request preserved for logging; modified copy forwarded

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{Request, Uri};
use uuid::Uuid;

use crate::error::ProxyError;
use crate::security::HeaderPolicy;

/// Unique identifier for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Read exactly `len` bytes of request body.
///
/// hyper enforces that the body matches the declared `Content-Length`, so
/// an error here means the client stopped sending.
pub async fn read_body(body: Body, len: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, len)
        .await
        .map_err(ProxyError::ClientDisconnected)
}

/// Build the request sent to the upstream.
pub fn build_upstream_request(
    parts: &Parts,
    target: Uri,
    body: Option<Bytes>,
    policy: &HeaderPolicy,
) -> Result<Request<Body>, ProxyError> {
    let body = body.map(Body::from).unwrap_or_else(Body::empty);
    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(target)
        .body(body)
        .map_err(|e| ProxyError::Internal(format!("failed to build upstream request: {}", e)))?;
    *request.headers_mut() = policy.outbound(&parts.headers);
    Ok(request)
}
