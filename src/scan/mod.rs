//! # WLAN Scan Module
//!
//! Produces scan batches for the uplink.
//!
//! This module handles:
//! - The `ScanSource` seam between the device cycle and the platform scanner
//! - Scanning on Linux through `iw` (see [`iw::IwScanner`])
//! - Ordering a batch strongest first before truncation

pub mod iw;

use crate::error::Result;
use crate::payload::protocol::{AccessPointObservation, ScanBatch};

pub use iw::IwScanner;

/// Source of WLAN scan batches
///
/// `scan` may block for seconds while the radio sweeps channels, so the
/// device cycle calls it on tokio's blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait ScanSource: Send + Sync {
    /// Perform a scan and return every visible access point
    fn scan(&self) -> Result<ScanBatch>;
}

/// Sort a batch strongest signal first
///
/// Stable, so access points with equal signal keep their scan order.
pub fn sort_by_signal(batch: &mut [AccessPointObservation]) {
    batch.sort_by(|a, b| b.signal_strength_dbm.cmp(&a.signal_strength_dbm));
}
