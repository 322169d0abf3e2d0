//! GridClick daemon entry point.
//!
//! Loads the configuration, installs the platform keyboard interceptor and
//! drives the overlay state machine until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! gridclick [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Config file [env: GRIDCLICK_CONFIG]
//!   --log-level <FILTER>  Log filter, e.g. "debug" [env: GRIDCLICK_LOG]
//!   --print-config        Print the effective configuration and exit
//! ```
//!
//! `RUST_LOG`, when set, overrides both `--log-level` and `daemon.log_level`.
//!
//! # Threads
//!
//! ```text
//! tokio runtime
//!  ├─ ctrl_c task        cancel overlay → stop interceptor
//!  └─ spawn_blocking     InputInterceptor::run (hook + OS message loop)
//!                          └─ OverlayController::handle_event per key
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gridclick_core::keymap::bindings::platform_toggle_key;
use gridclick_daemon::application::handle_keys::OverlayController;
use gridclick_daemon::infrastructure::overlay::SharedOverlay;
use gridclick_daemon::infrastructure::storage::config::{load_config, AppConfig};
use gridclick_daemon::infrastructure::{controller_handler, native_backend};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard-driven pointer control with a two-letter grid overlay.
#[derive(Debug, Parser)]
#[command(name = "gridclick", version)]
struct Cli {
    /// Configuration file.  Defaults to the platform config directory; a
    /// missing default file means built-in defaults.
    #[arg(long, env = "GRIDCLICK_CONFIG")]
    config: Option<PathBuf>,

    /// `tracing` filter directive.  Overrides `daemon.log_level`.
    #[arg(long, env = "GRIDCLICK_LOG")]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Filter directive used when `RUST_LOG` is not set.
    fn log_filter<'a>(&'a self, config: &'a AppConfig) -> &'a str {
        self.log_level.as_deref().unwrap_or(&config.daemon.log_level)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_filter(&config)))
        .with_context(|| format!("invalid log filter '{}'", cli.log_filter(&config)))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = config.controller_settings(platform_toggle_key())?;
    info!(
        toggle = ?settings.toggle_key,
        rows = settings.geometry.rows(),
        cols = settings.geometry.cols(),
        "GridClick starting"
    );

    let backend = native_backend(Arc::new(SharedOverlay::new(settings.geometry)))?;
    let controller = Arc::new(Mutex::new(OverlayController::new(
        settings,
        Arc::clone(&backend.synthesizer),
        Arc::clone(&backend.overlay) as _,
        Arc::clone(&backend.locator),
    )));

    // ── Graceful shutdown ─────────────────────────────────────────────────────
    //
    // Cancel first so a held drag button is released while synthesis still
    // works, then unhook.
    let shutdown = {
        let controller = Arc::clone(&controller);
        let interceptor = Arc::clone(&backend.interceptor);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received Ctrl+C, shutting down");
                    controller.lock().unwrap_or_else(PoisonError::into_inner).cancel();
                    interceptor.stop();
                }
                Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
            }
        })
    };

    // ── Interception loop ─────────────────────────────────────────────────────
    let handler = controller_handler(Arc::clone(&controller));
    let interceptor = Arc::clone(&backend.interceptor);
    let result = tokio::task::spawn_blocking(move || interceptor.run(handler))
        .await
        .context("interceptor thread panicked")?;

    shutdown.abort();
    controller.lock().unwrap_or_else(PoisonError::into_inner).cancel();

    if let Err(e) = result {
        error!("keyboard interception failed: {e}");
        return Err(e.into());
    }

    info!("GridClick stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_have_no_overrides() {
        let cli = Cli::parse_from(["gridclick"]);
        assert!(!cli.print_config);
        assert_eq!(cli.log_filter(&AppConfig::default()), "info");
    }

    #[test]
    fn test_log_level_flag_overrides_config() {
        let cli = Cli::parse_from(["gridclick", "--log-level", "debug"]);
        assert_eq!(cli.log_filter(&AppConfig::default()), "debug");
    }

    #[test]
    fn test_config_path_is_parsed() {
        let cli = Cli::parse_from(["gridclick", "--config", "/tmp/gc.toml", "--print-config"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gc.toml")));
        assert!(cli.print_config);
    }
}
