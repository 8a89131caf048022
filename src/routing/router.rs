//! Request classification.
//!
//! # Responsibilities
//! - Hold the single forwarding rule
//! - Decide, from method and path, how a request is served
//! - Build the upstream target URI for forwarded requests
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Classification is a pure function of method and URI
//! - Explicit dispatch variants rather than silent defaults

use axum::http::{Method, Uri};

use crate::config::ForwardingConfig;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// How a request will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Send to the upstream.
    Forward,
    /// Answer a CORS preflight locally.
    Preflight,
    /// Hand to the static file collaborator.
    Static,
    /// OPTIONS outside the forwarded prefix; the static layer has no handler.
    NotImplemented,
    /// 405, no body.
    MethodNotAllowed,
}

impl Dispatch {
    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Dispatch::Forward => "forward",
            Dispatch::Preflight => "preflight",
            Dispatch::Static => "static",
            Dispatch::NotImplemented => "not_implemented",
            Dispatch::MethodNotAllowed => "method_not_allowed",
        }
    }
}

/// Base address requests are forwarded to.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: String,
}

impl Upstream {
    pub fn new(base: &str) -> Result<Self, axum::http::uri::InvalidUri> {
        let base = base.trim_end_matches('/').to_string();
        base.parse::<Uri>()?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Upstream URI for the request target: base + path + query, verbatim.
    pub fn target(&self, uri: &Uri) -> Result<Uri, axum::http::uri::InvalidUri> {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.base, path_and_query).parse()
    }
}

/// A path prefix bound to an upstream.
#[derive(Debug, Clone)]
pub struct ForwardingRule {
    matcher: PathPrefixMatcher,
    upstream: Upstream,
}

impl ForwardingRule {
    pub fn from_config(config: &ForwardingConfig) -> Result<Self, axum::http::uri::InvalidUri> {
        Ok(Self {
            matcher: PathPrefixMatcher::new(config.path_prefix.clone()),
            upstream: Upstream::new(&config.upstream)?,
        })
    }

    pub fn matches(&self, uri: &Uri) -> bool {
        self.matcher.matches(uri)
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Classify a request by method and target.
    pub fn classify(&self, method: &Method, uri: &Uri) -> Dispatch {
        let matched = self.matches(uri);
        match *method {
            Method::GET | Method::POST | Method::PUT | Method::DELETE if matched => Dispatch::Forward,
            Method::OPTIONS if matched => Dispatch::Preflight,
            Method::GET => Dispatch::Static,
            Method::OPTIONS => Dispatch::NotImplemented,
            _ => Dispatch::MethodNotAllowed,
        }
    }
}
