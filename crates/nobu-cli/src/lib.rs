//! nobu CLI - a development server that serves native ES modules.
//!
//! This crate wraps the `nobu` core in an HTTP server and a command line:
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - `nobu.config.json` / environment / CLI configuration
//! - [`dev`] - the axum server and its configuration
//! - [`commands`] - command implementations
//! - [`error`] - CLI error types with actionable hints
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - terminal status messages
//!
//! # Example
//!
//! ```rust,no_run
//! use nobu_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
