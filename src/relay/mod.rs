//! Raw TCP relaying subsystem.
//!
//! # Data Flow
//! ```text
//! Client connects
//!     → net::Listener (bounded accept)
//!     → selector.select(client ip)
//!     → outbound connect to chosen backend
//!     → duplex byte copy until either side closes or errors
//! ```

pub mod tcp;

pub use tcp::TcpRelay;
