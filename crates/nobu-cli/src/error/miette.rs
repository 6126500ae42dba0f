//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert a [`CliError`] into a miette report for display by `main`.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Server(msg) => miette::miette!("Dev server failed: {}", msg),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidValue { field, value, hint } => miette::miette!(
            help = hint,
            "Invalid value for '{}': {}",
            field,
            value
        ),
        _ => miette::miette!("Configuration error: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_moves_hint_to_help() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: "0".to_string(),
            hint: "Use a port between 1 and 65535".to_string(),
        }));

        assert_eq!(report.to_string(), "Invalid value for 'port': 0");
        let help = report.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("Use a port between 1 and 65535"));
    }

    #[test]
    fn test_server_error() {
        let report = cli_error_to_miette(CliError::Server("address in use".to_string()));
        assert!(report.to_string().contains("address in use"));
    }
}
