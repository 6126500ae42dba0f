//! Development server module.
//!
//! Wraps the `nobu` request handler in an axum server. The handler is
//! shared read-only between requests; nothing is cached.

pub mod config;
pub mod server;

pub use config::DevConfig;
pub use server::{build_router, DevServer};
