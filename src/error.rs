//! Typed failures of the forwarding path.
//!
//! Each variant maps to exactly one client-visible outcome. The handler
//! logs through [`ProxyError::log`] and converts through `IntoResponse`.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The client went away while its request body was being read.
    #[error("client disconnected: {0}")]
    ClientDisconnected(#[source] axum::Error),

    /// The upstream could not be connected to (refused, DNS, connect timeout).
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] hyper_util::client::legacy::Error),

    /// The upstream accepted the connection but did not answer in time.
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// Any other transport-level failure talking to the upstream.
    #[error("upstream transport failure: {0}")]
    UpstreamTransport(#[source] hyper_util::client::legacy::Error),

    #[error("invalid Content-Length header")]
    InvalidContentLength,

    #[error("request body of {length} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { length: u64, limit: usize },

    /// Catch-all for failures that are our fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Never delivered; the peer is gone.
            ProxyError::ClientDisconnected(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnreachable(_) | ProxyError::UpstreamTransport(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::InvalidContentLength => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::ClientDisconnected(_) => "client_disconnected",
            ProxyError::UpstreamUnreachable(_) => "upstream_unreachable",
            ProxyError::UpstreamTimeout(_) => "upstream_timeout",
            ProxyError::UpstreamTransport(_) => "upstream_transport",
            ProxyError::InvalidContentLength => "invalid_content_length",
            ProxyError::PayloadTooLarge { .. } => "payload_too_large",
            ProxyError::Internal(_) => "internal",
        }
    }

    pub fn is_client_disconnect(&self) -> bool {
        matches!(self, ProxyError::ClientDisconnected(_))
    }

    /// Body sent to the client. Internal details are not exposed.
    fn message(&self) -> String {
        match self {
            ProxyError::ClientDisconnected(_) => String::new(),
            ProxyError::Internal(_) => "Proxy error: internal error".to_string(),
            other => format!("Proxy error: {}", other),
        }
    }

    /// Log at the severity the error class calls for.
    pub fn log(&self, request_id: &str, method: &str, path: &str) {
        match self {
            ProxyError::ClientDisconnected(e) => {
                tracing::debug!(request_id, method, path, error = %e, "Client disconnected");
            }
            ProxyError::InvalidContentLength | ProxyError::PayloadTooLarge { .. } => {
                tracing::debug!(request_id, method, path, error = %self, "Rejected request");
            }
            ProxyError::UpstreamUnreachable(_)
            | ProxyError::UpstreamTimeout(_)
            | ProxyError::UpstreamTransport(_) => {
                tracing::warn!(request_id, method, path, error = %self, "Upstream error");
            }
            ProxyError::Internal(_) => {
                tracing::error!(request_id, method, path, error = %self, "Proxy failure");
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_client_disconnect() {
            return status.into_response();
        }
        (status, self.message()).into_response()
    }
}

/// Classify a client error from the upstream HTTP client.
pub fn classify_upstream(err: hyper_util::client::legacy::Error) -> ProxyError {
    if err.is_connect() {
        ProxyError::UpstreamUnreachable(err)
    } else {
        ProxyError::UpstreamTransport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ProxyError::UpstreamTimeout(Duration::from_secs(1)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(ProxyError::InvalidContentLength.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::PayloadTooLarge { length: 10, limit: 5 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_message_is_generic() {
        let err = ProxyError::Internal("secret detail".into());
        assert_eq!(err.message(), "Proxy error: internal error");
    }

    #[test]
    fn timeout_message_is_diagnostic() {
        let err = ProxyError::UpstreamTimeout(Duration::from_secs(2));
        assert_eq!(err.message(), "Proxy error: upstream did not respond within 2s");
    }
}
