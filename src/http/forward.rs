//! Forwarding of matched requests to the upstream.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::error::ProxyError;
use crate::http::request::{build_upstream_request, read_body};
use crate::http::response::relay;
use crate::resilience::timeouts::upstream_call;
use crate::resilience::Timeouts;
use crate::routing::ForwardingRule;
use crate::security::limits::forwarded_body_len;
use crate::security::{CorsPolicy, HeaderPolicy};

pub type UpstreamClient = Client<HttpConnector, Body>;

/// Build the pooled upstream client with the configured connect timeout.
pub fn upstream_client(timeouts: &Timeouts) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(timeouts.connect));
    connector.set_nodelay(true);
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Sends one client request upstream and relays the answer.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    rule: Arc<ForwardingRule>,
    policy: HeaderPolicy,
    cors: CorsPolicy,
    timeouts: Timeouts,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(
        client: UpstreamClient,
        rule: Arc<ForwardingRule>,
        cors: CorsPolicy,
        timeouts: Timeouts,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            client,
            rule,
            policy: HeaderPolicy,
            cors,
            timeouts,
            max_body_bytes,
        }
    }

    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let target = self
            .rule
            .upstream()
            .target(&parts.uri)
            .map_err(|e| ProxyError::Internal(format!("invalid upstream target: {}", e)))?;

        // Length is validated before a single body byte is read.
        let body = match forwarded_body_len(&parts.headers, self.max_body_bytes)? {
            Some(len) => Some(read_body(body, len).await?),
            None => None,
        };

        let upstream_request = build_upstream_request(&parts, target, body, &self.policy)?;
        tracing::debug!(upstream_uri = %upstream_request.uri(), "Forwarding upstream");

        let response = upstream_call(self.timeouts.upstream, self.client.request(upstream_request)).await?;

        tracing::debug!(status = %response.status(), "Upstream responded");
        Ok(relay(response, &self.policy, &self.cors))
    }
}
