//! # Scan Payload Constants and Types
//!
//! Core definitions for the compact WLAN scan payload.
//!
//! ```text
//! byte 0:        record count (u8)
//! bytes 1..1+8k: k records of
//!                  bytes 0-5: MAC octets, address order
//!                  byte 6:    signal strength in dBm (i8)
//!                  byte 7:    channel (u8)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Size of the record count prefix
pub const PAYLOAD_COUNT_SIZE: usize = 1;

/// Size of one encoded access point record
pub const PAYLOAD_RECORD_SIZE: usize = 8;

/// Number of MAC octets in a record
pub const MAC_ADDRESS_LEN: usize = 6;

/// Most records the one-byte count field can declare
pub const MAX_RECORDS_ON_WIRE: usize = u8::MAX as usize;

/// Default truncation bound for local use
pub const DEFAULT_MAX_RECORDS: usize = 10;

/// One decoded batch of access points, in scan order
pub type ScanBatch = Vec<AccessPointObservation>;

/// WLAN hardware address (BSSID)
///
/// Displayed as lowercase colon-separated hex, e.g. `aa:dd:44:11:66:ff`.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MacAddress(pub [u8; MAC_ADDRESS_LEN]);

impl MacAddress {
    /// Parse a colon-separated hex address, case-insensitive
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation` unless the input is exactly six
    /// one- or two-digit hex octets.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let invalid = || {
            CodecError::PreconditionViolation(format!(
                "invalid MAC address '{}': expected aa:bb:cc:dd:ee:ff",
                s
            ))
        };

        let mut octets = [0u8; MAC_ADDRESS_LEN];
        let mut parts = s.trim().split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            // from_str_radix alone would accept a leading '+'
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }

    /// Raw octets in address order
    pub fn octets(&self) -> &[u8; MAC_ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl FromStr for MacAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One access point seen during a WLAN scan
///
/// Serializes to the geolocation-service shape
/// `{"macAddress": "..", "signalStrength": -23, "channel": 11}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAccessPoint", into = "RawAccessPoint")]
pub struct AccessPointObservation {
    /// BSSID of the access point
    pub mac_address: MacAddress,

    /// Received signal strength in dBm (typically 0 to -100)
    pub signal_strength_dbm: i8,

    /// WLAN channel number
    pub channel: u8,
}

impl AccessPointObservation {
    /// Create an observation from typed fields
    pub fn new(mac_address: MacAddress, signal_strength_dbm: i8, channel: u8) -> Self {
        Self {
            mac_address,
            signal_strength_dbm,
            channel,
        }
    }

    /// Create an observation from untyped scan values
    ///
    /// # Errors
    ///
    /// Returns `PreconditionViolation` if the MAC does not parse, the signal
    /// strength is outside -128..=127, or the channel is outside 0..=255.
    /// Values are never wrapped.
    pub fn try_new(mac_address: &str, signal_strength_dbm: i64, channel: i64) -> Result<Self, CodecError> {
        let mac_address = MacAddress::parse(mac_address)?;

        let signal_strength_dbm = i8::try_from(signal_strength_dbm).map_err(|_| {
            CodecError::PreconditionViolation(format!(
                "signal strength {} dBm does not fit in -128..=127",
                signal_strength_dbm
            ))
        })?;

        let channel = u8::try_from(channel).map_err(|_| {
            CodecError::PreconditionViolation(format!("channel {} does not fit in 0..=255", channel))
        })?;

        Ok(Self::new(mac_address, signal_strength_dbm, channel))
    }
}

/// Unvalidated JSON form of an observation, as scan logs and geolocation
/// requests carry it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAccessPoint {
    pub mac_address: String,
    pub signal_strength: i64,
    pub channel: i64,
}

impl TryFrom<RawAccessPoint> for AccessPointObservation {
    type Error = CodecError;

    fn try_from(raw: RawAccessPoint) -> Result<Self, Self::Error> {
        Self::try_new(&raw.mac_address, raw.signal_strength, raw.channel)
    }
}

impl From<AccessPointObservation> for RawAccessPoint {
    fn from(obs: AccessPointObservation) -> Self {
        Self {
            mac_address: obs.mac_address.to_string(),
            signal_strength: obs.signal_strength_dbm.into(),
            channel: obs.channel.into(),
        }
    }
}

/// Number of records kept when truncating `len` observations to `max_records`
pub fn retained_count(len: usize, max_records: usize) -> usize {
    len.min(max_records)
}

/// Encoded size in bytes of a payload carrying `records` observations
pub fn encoded_len(records: usize) -> usize {
    PAYLOAD_COUNT_SIZE + PAYLOAD_RECORD_SIZE * records
}

/// Largest record count whose payload fits in `payload_bytes`
///
/// Capped at 255, the most the count field can declare. Returns 0 when even
/// the count byte does not fit.
pub fn max_records_for_budget(payload_bytes: usize) -> usize {
    let records = payload_bytes.saturating_sub(PAYLOAD_COUNT_SIZE) / PAYLOAD_RECORD_SIZE;
    records.min(MAX_RECORDS_ON_WIRE)
}
