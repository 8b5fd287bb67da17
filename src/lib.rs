//! Minimal HTTP/1.1 server library.
//!
//! One request per TCP connection, parsed by hand, answered from a fixed
//! route table: root ping, path echo, user-agent echo, and file read/write
//! under an optional serving directory.

pub mod config;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
