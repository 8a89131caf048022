//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (Content-Length parse and size check)
//!     → headers.rs (strip Host / Connection before forwarding)
//!
//! Outgoing response:
//!     → headers.rs (strip Connection / Transfer-Encoding from upstream)
//!     → cors.rs (stamp Access-Control-Allow-* headers)
//! ```
//!
//! # Design Decisions
//! - Header policy is fixed and stateless; no per-request configuration
//! - Reject before reading: limits never touch the body

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::CorsPolicy;
pub use headers::HeaderPolicy;
