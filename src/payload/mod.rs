//! # Scan Payload Module
//!
//! Compact binary encoding of WLAN scan results for the radio uplink.
//!
//! This module handles:
//! - Truncating a scan batch to a per-medium record bound
//! - Packing each access point into a fixed 8-byte record
//! - Decoding and validating payloads on the ground-station side

pub mod protocol;
pub mod encoder;
pub mod decoder;
