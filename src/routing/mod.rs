//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ForwardingRule::classify)
//!     → matcher.rs (path prefix check)
//!     → Return: Dispatch (Forward / Preflight / Static / NotImplemented / MethodNotAllowed)
//! ```
//!
//! # Design Decisions
//! - One rule, compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same dispatch

pub mod matcher;
pub mod router;

pub use router::{Dispatch, ForwardingRule, Upstream};
