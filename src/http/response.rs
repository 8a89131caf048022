//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Strip `Connection` / `Transfer-Encoding`, stamp CORS headers
//! - Stream the body without buffering it
//!
//! # Design Decisions
//! - Status code relayed verbatim, HTTP error statuses included
//! - hyper re-frames the body for the client connection

use axum::body::Body;
use axum::http::Response;

use crate::security::{CorsPolicy, HeaderPolicy};

/// Turn an upstream response into the response sent to the client.
pub fn relay<B>(response: Response<B>, policy: &HeaderPolicy, cors: &CorsPolicy) -> Response<Body>
where
    B: hyper::body::Body<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = response.into_parts();
    parts.headers = policy.inbound(&parts.headers);
    cors.apply(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn relays_status_headers_and_body() {
        let upstream = Response::builder()
            .status(StatusCode::CREATED)
            .header(header::CONNECTION, "close")
            .header(header::TRANSFER_ENCODING, "chunked")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-upstream", "1")
            .body(Body::from("{\"id\":1}"))
            .unwrap();

        let relayed = relay(upstream, &HeaderPolicy, &CorsPolicy::default());

        assert_eq!(relayed.status(), StatusCode::CREATED);
        let headers = relayed.headers();
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-upstream"], "1");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = axum::body::to_bytes(relayed.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"{\"id\":1}");
    }

    #[tokio::test]
    async fn error_statuses_pass_through() {
        let upstream = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("missing"))
            .unwrap();
        let relayed = relay(upstream, &HeaderPolicy, &CorsPolicy::default());
        assert_eq!(relayed.status(), StatusCode::NOT_FOUND);
    }
}
