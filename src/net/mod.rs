//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tls.rs (optional TLS material for the HTTP listener)
//!     → Hand off to the relay or HTTP engine
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - TLS termination is optional and only applies to HTTP mode

pub mod listener;
pub mod tls;

pub use listener::{ConnectionPermit, Listener, ListenerError};
