//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits, SO_REUSEADDR)
//!     → connection.rs (lifecycle tracking, error classification)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded connection count prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - Accept errors never end the accept loop

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
