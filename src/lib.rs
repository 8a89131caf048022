//! Development forwarding proxy library.
//!
//! Forwards one path prefix (`/api/` by default) to a single upstream,
//! adds permissive CORS headers to every response and serves everything
//! else from a local directory.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
