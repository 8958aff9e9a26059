//! HTTP reverse-proxying subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → selector.select(client ip)
//!     → outbound request: same method + path, all headers copied,
//!       x-forwarded-for / x-forwarded-proto overwritten
//!     → body streamed to backend as received
//!     → backend status + headers copied onto the client response
//!     → response body streamed back
//! ```

pub mod server;

pub use server::HttpServer;
