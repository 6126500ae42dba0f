//! Development server command implementation.
//!
//! Loads and validates configuration, settles the bind address, then
//! serves until Ctrl+C.

use crate::cli::DevArgs;
use crate::config::NobuConfig;
use crate::dev::{DevConfig, DevServer};
use crate::error::{Result, ResultExt};
use crate::ui;

/// Execute the dev command.
///
/// # Errors
///
/// Returns errors for:
/// - Invalid configuration
/// - Missing entry document
/// - No bindable port
/// - Server startup failures
pub async fn execute(args: DevArgs) -> Result<()> {
    let config = NobuConfig::load(&args)?;
    config.validate()?;

    let root = std::fs::canonicalize(&config.root)
        .with_path(&config.root)
        .context("Failed to resolve project root")?;

    let index = root.join(&config.index);
    std::fs::metadata(&index)
        .with_path(&index)
        .with_hint(format!(
            "Create {} in the project root or pass --index",
            config.index
        ))?;

    let config = DevConfig::from_config(config)?;
    ui::info(&format!("Serving {}", root.display()));
    tracing::debug!(?config, "resolved dev server configuration");

    if config.open() {
        open_browser(&config.server_url());
    }

    let server = DevServer::new(config);
    ui::info("Press Ctrl+C to stop");
    server.start(shutdown_signal()).await?;

    ui::success("Development server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        ui::error(&format!("Failed to listen for Ctrl+C: {}", e));
        std::future::pending::<()>().await;
    }
    ui::info("Shutting down development server...");
}

/// Open the server URL in the default browser.
///
/// Uses platform-specific commands:
/// - macOS: `open`
/// - Windows: `start`
/// - Linux: `xdg-open`
fn open_browser(url: &str) {
    use tokio::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
