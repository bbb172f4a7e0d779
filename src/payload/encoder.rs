//! # Scan Payload Encoder
//!
//! Truncates a scan batch and packs it into the compact uplink payload.

use bytes::BufMut;

use super::protocol::*;
use crate::error::CodecError;

/// Encode a scan batch into a payload
///
/// Keeps only the first `max_records` observations (in scan order); the rest
/// are dropped without error. Callers pick `max_records` per transmission
/// medium, e.g. a small bound for the radio uplink.
///
/// # Arguments
///
/// * `batch` - Observations in scan order
/// * `max_records` - Truncation bound
///
/// # Returns
///
/// * `Result<Vec<u8>, CodecError>` - Payload of `1 + 8 * k` bytes, where
///   `k = min(batch.len(), max_records)`
///
/// # Errors
///
/// Returns `PreconditionViolation` if `k` exceeds 255, the most the count
/// byte can declare.
///
/// # Examples
///
/// ```
/// use wlan_tracker::payload::encoder::encode_scan_batch;
/// use wlan_tracker::payload::protocol::AccessPointObservation;
///
/// let obs = AccessPointObservation::try_new("aa:dd:44:11:66:ff", -23, 11).unwrap();
/// let payload = encode_scan_batch(&[obs], 10).unwrap();
/// assert_eq!(payload, [0x01, 0xAA, 0xDD, 0x44, 0x11, 0x66, 0xFF, 0xE9, 0x0B]);
/// ```
pub fn encode_scan_batch(batch: &[AccessPointObservation], max_records: usize) -> Result<Vec<u8>, CodecError> {
    let count = retained_count(batch.len(), max_records);

    let count_byte = u8::try_from(count).map_err(|_| {
        CodecError::PreconditionViolation(format!(
            "{} records exceed the wire limit of {}",
            count, MAX_RECORDS_ON_WIRE
        ))
    })?;

    let mut payload = Vec::with_capacity(encoded_len(count));
    payload.put_u8(count_byte);

    for obs in &batch[..count] {
        encode_observation(obs, &mut payload);
    }

    Ok(payload)
}

/// Append one 8-byte record to a buffer
///
/// Layout: 6 MAC octets, signal strength as two's complement, channel.
pub fn encode_observation<B: BufMut>(obs: &AccessPointObservation, buf: &mut B) {
    buf.put_slice(obs.mac_address.octets());
    buf.put_i8(obs.signal_strength_dbm);
    buf.put_u8(obs.channel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obs(mac: &str, signal: i64, channel: i64) -> AccessPointObservation {
        AccessPointObservation::try_new(mac, signal, channel).unwrap()
    }

    fn numbered_batch(len: usize) -> ScanBatch {
        (0..len)
            .map(|i| {
                AccessPointObservation::new(
                    MacAddress([0x02, 0x00, 0x00, 0x00, (i >> 8) as u8, i as u8]),
                    -((i % 100) as i8),
                    (i % 14 + 1) as u8,
                )
            })
            .collect()
    }

    #[test]
    fn test_encode_single_observation() {
        let payload = encode_scan_batch(&[obs("aa:dd:44:11:66:ff", -23, 11)], 10).unwrap();

        assert_eq!(payload, vec![0x01, 0xAA, 0xDD, 0x44, 0x11, 0x66, 0xFF, 0xE9, 0x0B]);
    }

    #[test]
    fn test_encode_empty_batch() {
        assert_eq!(encode_scan_batch(&[], 10).unwrap(), vec![0x00]);
        assert_eq!(encode_scan_batch(&[], 0).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_encode_max_records_zero() {
        let batch = numbered_batch(3);
        assert_eq!(encode_scan_batch(&batch, 0).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_encode_truncates_in_scan_order() {
        let batch = vec![
            obs("aa:bb:dd:bb:ff:00", -23, 11),
            obs("22:23:24:25:af:b2", -99, 2),
            obs("00:01:20:55:77:39", -10, 19),
        ];

        let payload = encode_scan_batch(&batch, 2).unwrap();

        assert_eq!(payload.len(), 17);
        assert_eq!(payload[0], 2);
        assert_eq!(&payload[1..7], &[0xAA, 0xBB, 0xDD, 0xBB, 0xFF, 0x00]);
        assert_eq!(&payload[9..15], &[0x22, 0x23, 0x24, 0x25, 0xAF, 0xB2]);
        assert_eq!(payload[15], 0x9D); // -99
        assert_eq!(payload[16], 2);
    }

    #[test]
    fn test_encode_signal_extremes() {
        let batch = vec![obs("00:00:00:00:00:01", -128, 0), obs("00:00:00:00:00:02", 127, 255)];

        let payload = encode_scan_batch(&batch, 10).unwrap();

        assert_eq!(payload[7], 0x80);
        assert_eq!(payload[8], 0x00);
        assert_eq!(payload[15], 0x7F);
        assert_eq!(payload[16], 0xFF);
    }

    #[test]
    fn test_encode_full_wire_capacity() {
        let batch = numbered_batch(MAX_RECORDS_ON_WIRE);

        let payload = encode_scan_batch(&batch, MAX_RECORDS_ON_WIRE).unwrap();

        assert_eq!(payload[0], 0xFF);
        assert_eq!(payload.len(), encoded_len(255));
    }

    #[test]
    fn test_encode_rejects_count_overflow() {
        let batch = numbered_batch(256);

        let result = encode_scan_batch(&batch, 1000);

        assert!(matches!(result, Err(CodecError::PreconditionViolation(_))));
    }

    #[test]
    fn test_encode_large_batch_with_small_bound() {
        // Oversized batches are fine as long as truncation brings them in range
        let batch = numbered_batch(300);

        let payload = encode_scan_batch(&batch, 5).unwrap();

        assert_eq!(payload[0], 5);
        assert_eq!(payload.len(), 41);
    }

    #[test]
    fn test_encode_observation_appends_eight_bytes() {
        let mut buf = vec![0x55];
        encode_observation(&obs("01:02:03:04:05:06", -1, 6), &mut buf);

        assert_eq!(buf, vec![0x55, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF, 0x06]);
    }

    proptest! {
        #[test]
        fn prop_encoded_length_is_fixed(len in 0usize..300, max_records in 0usize..=255) {
            let batch = numbered_batch(len);
            let payload = encode_scan_batch(&batch, max_records).unwrap();
            prop_assert_eq!(payload.len(), 1 + 8 * len.min(max_records));
            prop_assert_eq!(payload[0] as usize, len.min(max_records));
        }
    }
}
