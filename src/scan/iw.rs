//! Linux WLAN scanner backed by `iw dev <iface> scan`.
//!
//! `iw dev <iface> scan` triggers a fresh scan and needs `CAP_NET_ADMIN`;
//! `iw dev <iface> scan dump` reads the kernel's cached results and usually
//! works unprivileged.

use std::process::Command;

use tracing::{debug, warn};

use super::{sort_by_signal, ScanSource};
use crate::config::ScanConfig;
use crate::error::{Result, TrackerError};
use crate::payload::protocol::{AccessPointObservation, ScanBatch};

/// Scanner that shells out to `iw`
#[derive(Debug, Clone)]
pub struct IwScanner {
    /// Wireless interface name (e.g. `wlan0`)
    interface: String,
    /// Use `scan dump` instead of triggering a scan
    use_cached: bool,
    /// Order results strongest first
    sort_by_signal: bool,
}

impl IwScanner {
    /// Create a scanner for an interface, reading cached results in scan order
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            use_cached: true,
            sort_by_signal: false,
        }
    }

    /// Create a scanner from the `[scan]` config section
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            interface: config.interface.clone(),
            use_cached: config.use_cached,
            sort_by_signal: config.sort_by_signal,
        }
    }

    /// Interface this scanner reads from
    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn command_args(&self) -> Vec<&str> {
        let mut args = vec!["dev", self.interface.as_str(), "scan"];
        if self.use_cached {
            args.push("dump");
        }
        args
    }

    fn run_iw(&self) -> Result<String> {
        let args = self.command_args();
        debug!("Running iw {}", args.join(" "));

        let output = Command::new("iw")
            .args(&args)
            .output()
            .map_err(|e| TrackerError::Scan(format!("failed to run iw: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackerError::Scan(format!(
                "iw exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ScanSource for IwScanner {
    fn scan(&self) -> Result<ScanBatch> {
        let stdout = self.run_iw()?;
        let mut batch = parse_iw_scan(&stdout);
        if self.sort_by_signal {
            sort_by_signal(&mut batch);
        }
        debug!("iw reported {} access points on {}", batch.len(), self.interface);
        Ok(batch)
    }
}

/// One BSS stanza collected while parsing
#[derive(Debug, Default)]
struct PendingBss {
    mac: String,
    signal_dbm: Option<f64>,
    ds_channel: Option<i64>,
    primary_channel: Option<i64>,
    freq_mhz: Option<f64>,
}

impl PendingBss {
    fn finish(self) -> Option<AccessPointObservation> {
        let Some(signal) = self.signal_dbm else {
            debug!("Skipping {}: no signal reported", self.mac);
            return None;
        };

        let channel = self
            .ds_channel
            .or(self.primary_channel)
            .or_else(|| self.freq_mhz.and_then(|f| channel_from_frequency(f.round() as u32)));
        let Some(channel) = channel else {
            debug!("Skipping {}: no channel reported", self.mac);
            return None;
        };

        match AccessPointObservation::try_new(&self.mac, signal.round() as i64, channel) {
            Ok(obs) => Some(obs),
            Err(e) => {
                warn!("Skipping access point {}: {}", self.mac, e);
                None
            }
        }
    }
}

/// Parse `iw dev <iface> scan` output into observations, in output order
///
/// Stanzas without a signal or a resolvable channel are skipped, as are
/// stanzas whose values do not fit the payload fields.
pub fn parse_iw_scan(output: &str) -> ScanBatch {
    let mut batch = Vec::new();
    let mut pending: Option<PendingBss> = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("BSS ") {
            if let Some(obs) = pending.take().and_then(PendingBss::finish) {
                batch.push(obs);
            }
            let mac = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            pending = Some(PendingBss {
                mac: mac.to_string(),
                ..Default::default()
            });
            continue;
        }

        let Some(bss) = pending.as_mut() else {
            continue;
        };
        let line = line.trim();

        if let Some(value) = line.strip_prefix("signal:") {
            bss.signal_dbm = first_number(value);
        } else if let Some(value) = line.strip_prefix("freq:") {
            bss.freq_mhz = first_number(value);
        } else if let Some(value) = line.strip_prefix("DS Parameter set: channel") {
            bss.ds_channel = first_number(value).map(|c| c as i64);
        } else if let Some(value) = line.strip_prefix("* primary channel:") {
            bss.primary_channel = first_number(value).map(|c| c as i64);
        }
    }

    if let Some(obs) = pending.and_then(PendingBss::finish) {
        batch.push(obs);
    }

    batch
}

fn first_number(value: &str) -> Option<f64> {
    value.split_whitespace().next()?.parse().ok()
}

/// Map a center frequency in MHz to its WLAN channel number
pub fn channel_from_frequency(freq_mhz: u32) -> Option<i64> {
    let channel = match freq_mhz {
        2484 => 14,
        2412..=2472 => (freq_mhz - 2407) / 5,
        5150..=5895 => (freq_mhz - 5000) / 5,
        5955..=7115 => (freq_mhz - 5950) / 5,
        _ => return None,
    };
    Some(channel as i64)
}
