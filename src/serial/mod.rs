//! # Serial Uplink Module
//!
//! Hands encoded scan payloads to a serial-attached radio modem.
//!
//! This module handles:
//! - Opening the modem's serial port (8N1, configured baud rate)
//! - Falling back through common device paths
//! - Enforcing the link's payload size budget before transmit
//!
//! Joining the network, retries and acknowledgements are the modem's job.

pub mod port_trait;

use crate::config::UplinkConfig;
use crate::error::{Result, TrackerError};
use port_trait::{SerialModemPort, UplinkPort};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Device paths tried after the configured one (in order of preference)
pub const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters (most common for modem breakouts)
    "/dev/ttyACM0", // USB CDC devices
];

/// Radio uplink handler
///
/// Owns the port to the modem and counts what went out over it.
pub struct RadioUplink {
    port: Box<dyn UplinkPort>,
    max_payload_bytes: usize,
    payloads_sent: u64,
}

impl std::fmt::Debug for RadioUplink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioUplink")
            .field("device_path", &self.port.device_path())
            .field("max_payload_bytes", &self.max_payload_bytes)
            .field("payloads_sent", &self.payloads_sent)
            .finish_non_exhaustive()
    }
}

impl RadioUplink {
    /// Open the modem described by the `[uplink]` config section
    ///
    /// Tries the configured port first, then [`DEFAULT_DEVICE_PATHS`].
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` if no candidate could be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wlan_tracker::config::Config;
    /// use wlan_tracker::serial::RadioUplink;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let config = Config::load("config/default.toml")?;
    ///     let uplink = RadioUplink::open(&config.uplink)?;
    ///     println!("Modem at {}", uplink.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &UplinkConfig) -> Result<Self> {
        let mut paths = vec![config.port.as_str()];
        paths.extend(DEFAULT_DEVICE_PATHS.iter().filter(|p| **p != config.port));
        Self::open_with_paths(&paths, config.baud_rate, config.max_payload_bytes)
    }

    /// Open the first working device among `paths`
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - Modem baud rate
    /// * `max_payload_bytes` - Largest payload the link accepts
    pub fn open_with_paths(paths: &[&str], baud_rate: u32, max_payload_bytes: usize) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(stream) => {
                    info!("Opened radio modem at {} ({} baud)", path, baud_rate);
                    let port = SerialModemPort::new(stream, *path);
                    return Ok(Self::with_port(Box::new(port), max_payload_bytes));
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(TrackerError::SerialPortNotFound(paths.join(", ")))
    }

    /// Wrap an already-open port
    pub fn with_port(port: Box<dyn UplinkPort>, max_payload_bytes: usize) -> Self {
        Self {
            port,
            max_payload_bytes,
            payloads_sent: 0,
        }
    }

    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| TrackerError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Send one encoded payload to the modem
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` without touching the port if the payload
    /// exceeds the link budget, or `Serial` if the write fails.
    pub async fn send_payload(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.max_payload_bytes {
            return Err(TrackerError::PayloadTooLarge {
                size: payload.len(),
                max: self.max_payload_bytes,
            });
        }

        self.port
            .send(payload)
            .await
            .map_err(|e| TrackerError::Serial(format!("Failed to send payload: {}", e)))?;

        self.payloads_sent += 1;
        debug!(
            "Sent {}-byte payload to {}: {}",
            payload.len(),
            self.port.device_path(),
            hex::encode(payload)
        );
        Ok(())
    }

    /// Device path of the opened modem
    pub fn device_path(&self) -> &str {
        self.port.device_path()
    }

    /// Largest payload this uplink accepts
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    /// Number of payloads handed to the modem so far
    pub fn payloads_sent(&self) -> u64 {
        self.payloads_sent
    }
}
