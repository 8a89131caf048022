//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper-util auto builder, Axum router, dispatch)
//!     → routing (Forward / Preflight / Static / 405 / 501)
//!     → forward.rs
//!         → request.rs (read Content-Length body, build outbound request)
//!         → upstream client (connect + head timeouts)
//!         → response.rs (filter headers, stamp CORS, stream body)
//!     → static_files.rs (ServeDir)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use forward::Forwarder;
pub use request::RequestId;
pub use server::{HttpServer, ServerError};
