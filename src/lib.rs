//! TCP/HTTP load balancer library.

pub mod balance;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;

pub use balance::{Backend, BackendRegistry, BackendSelector};
pub use config::LbConfig;
pub use health::HealthMonitor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::TcpRelay;
