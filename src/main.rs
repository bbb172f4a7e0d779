//! # WLAN Tracker
//!
//! Periodically scans nearby WLAN access points and uplinks a compact
//! summary through a serial-attached radio modem.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use wlan_tracker::config::{Config, LoggingConfig};
use wlan_tracker::cycle::run_until_shutdown;
use wlan_tracker::scan::IwScanner;
use wlan_tracker::serial::RadioUplink;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "wlan-tracker.log";

/// Main entry point for WLAN Tracker
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging to stderr or a daily-rolling file
///    - Open the radio modem if uplink is enabled
///
/// 2. **Main Loop**
///    - Every `interval_s` seconds: scan, encode, uplink
///    - Stage failures are logged and the loop continues
///    - Ctrl+C ends the loop, even in the middle of a cycle
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded or the modem cannot
/// be opened.
///
/// # Examples
///
/// ```bash
/// cargo run --release --bin wlan-tracker -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging)?;

    info!("WLAN Tracker v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    let scanner = IwScanner::from_config(&config.scan);
    info!("Scanning on interface {}", scanner.interface());

    let mut uplink = if config.uplink.enabled {
        let uplink = RadioUplink::open(&config.uplink)?;
        info!(
            "Radio uplink at {}, up to {} access points per payload",
            uplink.device_path(),
            config.uplink.max_records
        );
        Some(uplink)
    } else {
        warn!("Radio uplink disabled, scans are only logged");
        None
    };

    info!("Running a scan cycle every {}s", config.cycle.interval_s);
    info!("Press Ctrl+C to exit");

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down..."),
            Err(e) => {
                warn!("Cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let cycle_count = run_until_shutdown(
        Arc::new(scanner),
        uplink.as_mut(),
        config.uplink.max_records,
        Duration::from_secs(config.cycle.interval_s),
        shutdown,
    )
    .await;

    info!("Total cycles run: {}", cycle_count);
    if let Some(uplink) = &uplink {
        info!("Total payloads sent: {}", uplink.payloads_sent());
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` directives take precedence over the configured level. Returns
/// the appender guard when logging to a file; it must live until exit so
/// buffered lines get flushed.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(config.level.parse()?)
        .from_env_lossy();

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_configured_levels_parse_as_directives() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let directive: Result<tracing_subscriber::filter::Directive, _> = level.parse();
            assert!(directive.is_ok(), "Level {} should parse", level);
        }
    }
}
