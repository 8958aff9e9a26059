//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build registry/selector → Spawn health
//!     monitor → Run the configured engine
//!
//! Shutdown:
//!     SIGTERM/SIGINT → broadcast via shutdown.rs → engines and health
//!     monitor exit their loops
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
