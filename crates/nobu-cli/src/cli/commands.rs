use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::validation::parse_host;

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server
    ///
    /// Serves the project root over HTTP. Nothing is bundled or cached:
    /// every request reads the current file from disk.
    Dev(DevArgs),
}

/// Arguments for the dev command.
///
/// Unset options fall back to `nobu.config.json`, then `NOBU_*`
/// environment variables, then built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct DevArgs {
    /// Project root to serve (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Port for the development server [default: 3000]
    ///
    /// If the port is taken, the next free port (up to 10 above) is used.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 127.0.0.1]
    #[arg(long, value_name = "HOST", value_parser = parse_host)]
    pub host: Option<String>,

    /// Entry document served for `/` [default: index.html]
    #[arg(long, value_name = "FILE")]
    pub index: Option<String>,

    /// Dependency directory holding installed packages [default: node_modules]
    #[arg(long, value_name = "DIR")]
    pub modules_dir: Option<PathBuf>,

    /// Directory static assets are served from [default: ROOT]
    #[arg(long, value_name = "DIR")]
    pub asset_dir: Option<PathBuf>,

    /// Path to a config file (defaults to ROOT/nobu.config.json when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Open the browser once the server is listening
    #[arg(long)]
    pub open: bool,
}
