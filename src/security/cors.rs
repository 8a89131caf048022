//! Permissive cross-origin headers.
//!
//! The three `Access-Control-Allow-*` headers are set on every response:
//! relayed upstream responses, synthesized preflights, static files and
//! error responses alike. Upstream values for these names are overridden.

use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_LENGTH,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CorsConfig;

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, axum::http::header::InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
        })
    }

    fn entries(&self) -> [(HeaderName, &HeaderValue); 3] {
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, &self.allow_origin),
            (ACCESS_CONTROL_ALLOW_METHODS, &self.allow_methods),
            (ACCESS_CONTROL_ALLOW_HEADERS, &self.allow_headers),
        ]
    }

    /// Set the CORS headers, replacing any existing values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.entries() {
            headers.insert(name, value.clone());
        }
    }

    /// `200 OK` carrying only the CORS headers and an empty body.
    pub fn preflight_response(&self) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        self.apply(response.headers_mut());
        response
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        response
    }

    /// Response layers that stamp the CORS headers on anything the router returns.
    pub fn layers(&self) -> [SetResponseHeaderLayer<HeaderValue>; 3] {
        self.entries()
            .map(|(name, value)| SetResponseHeaderLayer::overriding(name, value.clone()))
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            allow_headers: HeaderValue::from_static("Content-Type, Authorization"),
        }
    }
}
