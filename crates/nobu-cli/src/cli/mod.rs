//! Command-line interface definition for nobu.
//!
//! Global flags control logging and colors; each subcommand carries its
//! own arguments. Every argument is optional so that `nobu.config.json`
//! and `NOBU_*` environment variables can fill the gaps.

mod commands;
mod validation;

use clap::Parser;

pub use commands::{Command, DevArgs};
pub use validation::parse_host;

/// nobu - a development server for native ES modules
#[derive(Parser, Debug)]
#[command(
    name = "nobu",
    version,
    about = "Serve native ES modules and Vue components without bundling",
    long_about = "nobu serves your project straight from disk. Bare imports are rewritten to\n\
                  /@modules/ URLs, dependencies are resolved through package.json, and Vue\n\
                  single-file components are split into script, template and style modules."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Logs how every request is classified and which files are read.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
