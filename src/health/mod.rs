//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs:
//!     Interval tick (first tick immediate)
//!     → fan out probe.rs per backend with a recognized check
//!     → join all probes (completion barrier)
//!     → registry.rebuild_valid() once
//!
//! probe.rs:
//!     port     — TCP connect within timeout
//!     http     — GET fixed path, 2xx within timeout
//!     endpoint — GET configurable path, scheme from backend.secure
//! ```
//!
//! # Design Decisions
//! - A cycle never partially completes: the valid set is only swapped
//!   after the completion barrier
//! - Probe outcomes within a cycle have no defined relative order
//! - A timed-out probe is abandoned (request dropped), not left to
//!   complete late

pub mod monitor;
pub mod probe;

pub use monitor::HealthMonitor;
