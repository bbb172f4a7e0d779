//! # WLAN Tracker Library
//!
//! Scan nearby WLAN access points and uplink them over a low-bandwidth radio.
//!
//! The core is the compact scan payload codec in [`payload`]: a one-byte
//! record count followed by fixed 8-byte access point records, small enough
//! for duty-cycle limited links such as LoRaWAN. The remaining modules wire
//! it to a Linux scanner, a serial radio modem, and ground-station tooling.

pub mod config;
pub mod error;
pub mod payload;
pub mod scan;
pub mod serial;
pub mod cycle;
pub mod ground;
