//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Config file (TOML or JSON)
//!     → loader.rs (read + parse)
//!     → validation.rs (semantic checks, all errors collected)
//!     → schema.rs types handed to the rest of the system
//! ```
//!
//! # Design Decisions
//! - Config is an immutable value passed to constructors; runtime state
//!   (enabled flags, rotation cursor, routing table) lives in the balance
//!   subsystem, never in the config
//! - Backends are fixed at startup; there is no reload path

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CheckConfig, LbConfig, Mode, ObservabilityConfig, ServerConfig, TlsConfig,
};
