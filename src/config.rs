//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{Result, TrackerError};
use crate::payload::protocol::{encoded_len, MAX_RECORDS_ON_WIRE};

/// Baud rates accepted by common serial radio modems
const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

/// Log levels accepted in `[logging] level`
const SUPPORTED_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub uplink: UplinkConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// WLAN scan configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Read the kernel's cached results instead of triggering a scan
    #[serde(default = "default_use_cached")]
    pub use_cached: bool,

    /// Order access points strongest first so truncation keeps the best ones
    #[serde(default = "default_sort_by_signal")]
    pub sort_by_signal: bool,
}

/// Radio uplink configuration
#[derive(Debug, Deserialize, Clone)]
pub struct UplinkConfig {
    #[serde(default = "default_uplink_enabled")]
    pub enabled: bool,

    #[serde(default = "default_uplink_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_max_records")]
    pub max_records: usize,

    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

/// Scan cycle configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CycleConfig {
    #[serde(default = "default_interval_s")]
    pub interval_s: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Empty logs to stderr only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_interface() -> String { "wlan0".to_string() }
fn default_use_cached() -> bool { true }
fn default_sort_by_signal() -> bool { true }

fn default_uplink_enabled() -> bool { true }
fn default_uplink_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 57600 }
fn default_max_records() -> usize { 5 }
fn default_max_payload_bytes() -> usize { 51 }

fn default_interval_s() -> u64 { 300 }

fn default_log_level() -> String { "info".to_string() }

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            use_cached: default_use_cached(),
            sort_by_signal: default_sort_by_signal(),
        }
    }
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            enabled: default_uplink_enabled(),
            port: default_uplink_port(),
            baud_rate: default_baud_rate(),
            max_records: default_max_records(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_s: default_interval_s(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wlan_tracker::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.scan.interface.is_empty() {
            return Err(invalid("scan interface cannot be empty"));
        }

        if self.uplink.enabled && self.uplink.port.is_empty() {
            return Err(invalid("uplink port cannot be empty when enabled"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.uplink.baud_rate) {
            return Err(invalid("baud_rate must be one of: 9600, 19200, 38400, 57600, 115200"));
        }

        if self.uplink.max_records == 0 || self.uplink.max_records > MAX_RECORDS_ON_WIRE {
            return Err(invalid("max_records must be between 1 and 255"));
        }

        if self.uplink.max_payload_bytes < encoded_len(1) {
            return Err(invalid("max_payload_bytes must be at least 9 (one record)"));
        }

        if encoded_len(self.uplink.max_records) > self.uplink.max_payload_bytes {
            return Err(invalid(format!(
                "max_records {} needs {} bytes, more than max_payload_bytes {}",
                self.uplink.max_records,
                encoded_len(self.uplink.max_records),
                self.uplink.max_payload_bytes
            )));
        }

        if self.cycle.interval_s == 0 || self.cycle.interval_s > 86_400 {
            return Err(invalid("interval_s must be between 1 and 86400"));
        }

        if !SUPPORTED_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> TrackerError {
    TrackerError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[scan]
interface = "wlp2s0"

[uplink]
port = "/dev/ttyACM0"
max_records = 4

[cycle]
interval_s = 60
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.scan.interface, "wlp2s0");
        assert!(config.scan.use_cached);
        assert_eq!(config.uplink.port, "/dev/ttyACM0");
        assert_eq!(config.uplink.max_records, 4);
        assert_eq!(config.uplink.baud_rate, 57600);
        assert_eq!(config.cycle.interval_s, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.scan.interface, "wlan0");
        assert_eq!(config.uplink.max_records, 5);
        assert_eq!(config.cycle.interval_s, 300);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/wlan-tracker.toml");
        assert!(matches!(result, Err(TrackerError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[uplink\nport = ");
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_repo_default_config_is_valid() {
        let contents = include_str!("../config/default.toml");
        assert!(Config::from_toml(contents).is_ok());
    }

    #[test]
    fn test_empty_interface() {
        let mut config = Config::default();
        config.scan.interface = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_port_when_enabled() {
        let mut config = Config::default();
        config.uplink.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_port_when_disabled() {
        let mut config = Config::default();
        config.uplink.enabled = false;
        config.uplink.port = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.uplink.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &SUPPORTED_BAUD_RATES {
            let mut config = Config::default();
            config.uplink.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_max_records_zero() {
        let mut config = Config::default();
        config.uplink.max_records = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_records_above_wire_limit() {
        let mut config = Config::default();
        config.uplink.max_payload_bytes = 10_000;
        config.uplink.max_records = 256;
        assert!(config.validate().is_err());

        config.uplink.max_records = 255;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_exceeds_payload_budget() {
        let mut config = Config::default();
        config.uplink.max_payload_bytes = 51;
        config.uplink.max_records = 7; // 57 bytes
        assert!(config.validate().is_err());

        config.uplink.max_records = 6; // 49 bytes
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_payload_bytes_too_small() {
        let mut config = Config::default();
        config.uplink.max_records = 1;
        config.uplink.max_payload_bytes = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_zero() {
        let mut config = Config::default();
        config.cycle.interval_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_too_high() {
        let mut config = Config::default();
        config.cycle.interval_s = 86_401;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_interface(), "wlan0");
        assert_eq!(default_use_cached(), true);
        assert_eq!(default_sort_by_signal(), true);
        assert_eq!(default_uplink_enabled(), true);
        assert_eq!(default_uplink_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 57600);
        assert_eq!(default_max_records(), 5);
        assert_eq!(default_max_payload_bytes(), 51);
        assert_eq!(default_interval_s(), 300);
        assert_eq!(default_log_level(), "info");
    }
}
