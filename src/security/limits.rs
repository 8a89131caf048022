//! Request body limits.
//!
//! # Responsibilities
//! - Parse the `Content-Length` header
//! - Enforce the maximum forwarded body size
//!
//! # Design Decisions
//! - Limits checked from the header before any body bytes are read
//! - Absent or zero `Content-Length` means no body is forwarded
//! - Return 400 for unparsable lengths, 413 Payload Too Large over the limit

use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;

use crate::error::ProxyError;

/// Number of body bytes to read and forward, per the `Content-Length` header.
///
/// Returns `Ok(None)` when there is no body to forward.
pub fn forwarded_body_len(headers: &HeaderMap, max_body_bytes: usize) -> Result<Option<usize>, ProxyError> {
    let Some(raw) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };

    let length = raw
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or(ProxyError::InvalidContentLength)?;

    if length == 0 {
        return Ok(None);
    }
    if length > max_body_bytes as u64 {
        return Err(ProxyError::PayloadTooLarge {
            length,
            limit: max_body_bytes,
        });
    }
    Ok(Some(length as usize))
}
