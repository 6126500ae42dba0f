use crate::cli::DevArgs;
use crate::config::{NobuConfig, CONFIG_FILE};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variables read after the `NOBU_` prefix.
const ENV_KEYS: [&str; 7] = [
    "root",
    "index",
    "modules_dir",
    "asset_dir",
    "host",
    "port",
    "open",
];

/// The CLI arguments that were actually given.
///
/// Unset options are skipped so they never mask the file or environment.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modules_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open: Option<bool>,
}

impl From<&DevArgs> for CliOverrides {
    fn from(args: &DevArgs) -> Self {
        Self {
            root: args.root.clone(),
            index: args.index.clone(),
            modules_dir: args.modules_dir.clone(),
            asset_dir: args.asset_dir.clone(),
            host: args.host.clone(),
            port: args.port,
            // A flag can only switch opening on
            open: args.open.then_some(true),
        }
    }
}

impl NobuConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &DevArgs) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(args)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        // NOBU_PORT, NOBU_MODULES_DIR, ...
        figment = figment.merge(
            Env::prefixed("NOBU_")
                .only(&ENV_KEYS)
                .lowercase(false)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from(args)));

        figment
            .extract()
            .map_err(|e| ConfigError::from(e).into())
    }

    /// An explicit `--config` must exist; the default file is optional.
    fn config_file(args: &DevArgs) -> Result<Option<PathBuf>> {
        if let Some(path) = &args.config {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.clone()).into());
            }
            return Ok(Some(path.clone()));
        }

        let root = args.root.as_deref().unwrap_or(Path::new("."));
        let default_path = root.join(CONFIG_FILE);
        Ok(default_path.is_file().then_some(default_path))
    }
}

/// `MODULES_DIR` -> `modulesDir`
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper = false;

    for c in key.chars() {
        if c == '_' {
            upper = !field.is_empty();
        } else if upper {
            field.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }

    field
}
