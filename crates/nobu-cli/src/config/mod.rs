//! Configuration for the nobu dev server with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and a config file.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use nobu::HandlerOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;

/// File name looked up in the project root when `--config` is not given.
pub const CONFIG_FILE: &str = "nobu.config.json";

/// nobu configuration - loaded from nobu.config.json, NOBU_* or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NobuConfig {
    /// Project root served at `/`
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Entry document served for `/`, relative to `root`
    #[serde(default = "default_index")]
    pub index: String,

    /// Directory holding installed packages, absolute or relative to `root`
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,

    /// Directory static assets are served from, absolute or relative to
    /// `root` (defaults to `root`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_dir: Option<PathBuf>,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open the browser once listening
    #[serde(default)]
    pub open: bool,
}

impl Default for NobuConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            index: default_index(),
            modules_dir: default_modules_dir(),
            asset_dir: None,
            host: default_host(),
            port: default_port(),
            open: false,
        }
    }
}

impl NobuConfig {
    /// Options for the request handler.
    pub fn to_handler_options(&self) -> HandlerOptions {
        let options = HandlerOptions::new(&self.root)
            .with_index(&self.index)
            .with_modules_dir(&self.modules_dir);

        match &self.asset_dir {
            Some(dir) => options.with_asset_dir(dir),
            None => options,
        }
    }
}
