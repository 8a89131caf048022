//! Header filtering between client and upstream.
//!
//! # Responsibilities
//! - Drop `Host` and `Connection` from requests headed upstream
//! - Drop `Connection` and `Transfer-Encoding` from relayed responses
//!
//! # Design Decisions
//! - Names compare case-insensitively (`HeaderName` is already lowercase)
//! - Order and repetition of the remaining headers are preserved
//! - The outbound `Host` is set by the HTTP client from the upstream URI

use axum::http::header::{CONNECTION, HOST, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName};

/// Request headers never forwarded upstream.
pub const OUTBOUND_STRIPPED: [HeaderName; 2] = [HOST, CONNECTION];

/// Upstream response headers never relayed to the client.
pub const INBOUND_STRIPPED: [HeaderName; 2] = [CONNECTION, TRANSFER_ENCODING];

/// The fixed header policy applied in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPolicy;

impl HeaderPolicy {
    /// Headers to send upstream, given the client's request headers.
    pub fn outbound(&self, headers: &HeaderMap) -> HeaderMap {
        filter(headers, &OUTBOUND_STRIPPED)
    }

    /// Headers to relay to the client, given the upstream response headers.
    pub fn inbound(&self, headers: &HeaderMap) -> HeaderMap {
        filter(headers, &INBOUND_STRIPPED)
    }
}

fn filter(headers: &HeaderMap, stripped: &[HeaderName]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if !stripped.contains(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
