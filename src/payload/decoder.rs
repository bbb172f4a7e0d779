//! # Scan Payload Decoder
//!
//! Recovers a scan batch from an uplink payload.

use bytes::Buf;

use super::protocol::*;
use crate::error::CodecError;

/// Decode a complete scan payload
///
/// # Arguments
///
/// * `payload` - Payload bytes (count byte followed by 8-byte records)
///
/// # Returns
///
/// * `Result<ScanBatch, CodecError>` - Observations in their encoded order
///
/// # Errors
///
/// Returns error if:
/// - Payload is empty, or shorter than its record count implies (`TruncatedInput`)
/// - Payload has bytes past the last record (`TrailingData`)
///
/// Nothing is returned for a rejected payload, not even the records that
/// were complete.
pub fn decode_scan_batch(payload: &[u8]) -> Result<ScanBatch, CodecError> {
    let mut buf = payload;

    if !buf.has_remaining() {
        return Err(CodecError::TruncatedInput {
            expected: PAYLOAD_COUNT_SIZE,
            actual: 0,
        });
    }

    let count = buf.get_u8() as usize;
    let expected = encoded_len(count);

    if payload.len() < expected {
        return Err(CodecError::TruncatedInput {
            expected,
            actual: payload.len(),
        });
    }

    // Trailing bytes are rejected rather than ignored; no producer pads payloads
    if payload.len() > expected {
        return Err(CodecError::TrailingData {
            expected,
            actual: payload.len(),
        });
    }

    let mut batch = Vec::with_capacity(count);
    let mut record = [0u8; PAYLOAD_RECORD_SIZE];
    for _ in 0..count {
        buf.copy_to_slice(&mut record);
        batch.push(decode_observation(&record));
    }

    Ok(batch)
}

/// Decode one 8-byte record
pub fn decode_observation(record: &[u8; PAYLOAD_RECORD_SIZE]) -> AccessPointObservation {
    let mut buf = &record[..];

    let mut mac = [0u8; MAC_ADDRESS_LEN];
    buf.copy_to_slice(&mut mac);

    AccessPointObservation {
        mac_address: MacAddress(mac),
        signal_strength_dbm: buf.get_i8(),
        channel: buf.get_u8(),
    }
}
