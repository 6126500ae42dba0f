use crate::config::NobuConfig;
use crate::error::{ConfigError, Result};
use std::net::IpAddr;
use std::path::{Component, Path};

/// Check that a configured path stays inside the project root.
fn validate_relative(field: &str, path: &Path, example: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: String::new(),
            hint: format!("Provide a path relative to the project root (e.g. {example})"),
        }
        .into());
    }

    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: path.display().to_string(),
            hint: format!("Must be relative to the project root without '..' (e.g. {example})"),
        }
        .into());
    }

    Ok(())
}

/// Check a configured directory. Absolute paths are used as-is, relative
/// ones resolve against the project root. Neither may contain `..`.
fn validate_dir(field: &str, path: &Path, example: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: String::new(),
            hint: format!("Provide a directory path (e.g. {example})"),
        }
        .into());
    }

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: path.display().to_string(),
            hint: format!("Use an absolute path or one without '..' (e.g. {example})"),
        }
        .into());
    }

    Ok(())
}

impl NobuConfig {
    /// Validate configuration before the server starts.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "The project root does not exist".to_string(),
            }
            .into());
        }

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "The project root must be a directory".to_string(),
            }
            .into());
        }

        validate_relative("index", Path::new(&self.index), "index.html")?;
        validate_dir("modulesDir", &self.modules_dir, "node_modules")?;
        if let Some(asset_dir) = &self.asset_dir {
            validate_dir("assetDir", asset_dir, "public")?;
        }

        if self.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
            }
            .into());
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Choose a port between 1 and 65535".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
