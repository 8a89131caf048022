//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect timeout on the connector, head timeout on the call)
//!     → On failure: typed ProxyError (unreachable / timeout / transport)
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - No retries: forwarded requests may not be idempotent

pub mod timeouts;

pub use timeouts::Timeouts;
