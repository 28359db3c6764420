//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - The reqwest HTTP transport (http)

pub mod config;
pub mod http;

pub use config::Config;
pub use http::ReqwestTransport;
