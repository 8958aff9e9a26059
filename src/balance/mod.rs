//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Health cycle completes
//!     → registry.rs (rebuild valid-backend snapshot atomically)
//!
//! New connection / request
//!     → selector.rs (sticky lookup or round-robin rotation)
//!     → backend.rs (address/URL of the chosen backend)
//!     → relay or HTTP proxy engine
//! ```
//!
//! # Design Decisions
//! - Registry state is the only data mutated by a background task (health
//!   checks) and read on the request path; all of it is atomic or swapped
//!   wholesale, so no locks are held across awaits
//! - Engines copy the backend's address values at selection time; nothing
//!   holds a live reference that a later health cycle could invalidate

pub mod backend;
pub mod registry;
pub mod selector;

pub use backend::Backend;
pub use registry::BackendRegistry;
pub use selector::BackendSelector;
