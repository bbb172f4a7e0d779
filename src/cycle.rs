//! # Scan Cycle
//!
//! One pass of the device loop: scan, encode, uplink.
//!
//! Each stage logs its own failure and the cycle carries on with what it
//! has. A failed scan still uplinks an empty batch, so the ground station
//! keeps receiving a heartbeat.
//!
//! [`run_until_shutdown`] repeats the pass on a fixed period until a
//! shutdown future resolves, including while a pass is still in flight.

use std::future::Future;
use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::payload::encoder::encode_scan_batch;
use crate::payload::protocol::{max_records_for_budget, retained_count, ScanBatch};
use crate::scan::ScanSource;
use crate::serial::RadioUplink;

/// Outcome of one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Access points found by the scan
    pub scanned: usize,

    /// Scan stage failed (`scanned` is then 0)
    pub scan_failed: bool,

    /// Records carried by the uplinked payload, if one was sent
    pub uplinked_records: Option<usize>,
}

/// Run one scan → encode → uplink pass
///
/// The scan runs on the blocking pool so a slow `iw` sweep does not stall
/// the runtime.
///
/// # Arguments
///
/// * `scanner` - Scan collaborator
/// * `uplink` - Radio uplink, or `None` when uplink is disabled
/// * `max_records` - Truncation bound for the uplink payload; further capped
///   by what fits in the uplink's payload budget
pub async fn run_cycle<S>(scanner: Arc<S>, uplink: Option<&mut RadioUplink>, max_records: usize) -> CycleReport
where
    S: ScanSource + ?Sized + 'static,
{
    let mut report = CycleReport::default();

    let batch = match scan_blocking(scanner).await {
        Ok(batch) => {
            info!("Scanned {} access points", batch.len());
            for obs in &batch {
                debug!(
                    "  {} {} dBm channel {}",
                    obs.mac_address, obs.signal_strength_dbm, obs.channel
                );
            }
            batch
        }
        Err(reason) => {
            warn!("WLAN scan failed: {}", reason);
            report.scan_failed = true;
            Vec::new()
        }
    };
    report.scanned = batch.len();

    let Some(uplink) = uplink else {
        return report;
    };

    let max_records = max_records.min(max_records_for_budget(uplink.max_payload_bytes()));
    let payload = match encode_scan_batch(&batch, max_records) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to encode scan payload: {}", e);
            return report;
        }
    };

    let records = retained_count(batch.len(), max_records);
    match uplink.send_payload(&payload).await {
        Ok(()) => {
            info!(
                "Uplinked {} of {} access points ({} bytes)",
                records,
                batch.len(),
                payload.len()
            );
            report.uplinked_records = Some(records);
        }
        Err(e) => warn!("Uplink failed: {}", e),
    }

    report
}

async fn scan_blocking<S>(scanner: Arc<S>) -> std::result::Result<ScanBatch, String>
where
    S: ScanSource + ?Sized + 'static,
{
    match tokio::task::spawn_blocking(move || scanner.scan()).await {
        Ok(Ok(batch)) => Ok(batch),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("scan task failed: {}", e)),
    }
}

/// Run cycles every `period` until `shutdown` resolves
///
/// The shutdown future is created once by the caller and polled across
/// iterations, so a signal arriving mid-cycle is not lost: the in-flight
/// cycle is abandoned and the loop returns. The first cycle starts
/// immediately.
///
/// # Returns
///
/// Number of cycles started
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use tokio::time::Duration;
/// use wlan_tracker::cycle::run_until_shutdown;
/// use wlan_tracker::scan::IwScanner;
///
/// # async fn example() {
/// let scanner = Arc::new(IwScanner::new("wlan0"));
/// let shutdown = async {
///     let _ = tokio::signal::ctrl_c().await;
/// };
/// let cycles = run_until_shutdown(scanner, None, 5, Duration::from_secs(300), shutdown).await;
/// # }
/// ```
pub async fn run_until_shutdown<S, F>(
    scanner: Arc<S>,
    mut uplink: Option<&mut RadioUplink>,
    max_records: usize,
    period: Duration,
    shutdown: F,
) -> u64
where
    S: ScanSource + ?Sized + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut cycle_interval = interval(period);
    cycle_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycle_count: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            _ = cycle_interval.tick() => {
                cycle_count += 1;
                tokio::select! {
                    biased;

                    _ = &mut shutdown => {
                        info!("Shutdown requested during cycle {}", cycle_count);
                        break;
                    }

                    report = run_cycle(Arc::clone(&scanner), uplink.as_deref_mut(), max_records) => {
                        info!(
                            "Cycle {} done: {} access points, {} uplinked",
                            cycle_count,
                            report.scanned,
                            report.uplinked_records.map_or("none".to_string(), |n| n.to_string())
                        );
                    }
                }
            }
        }
    }

    cycle_count
}
