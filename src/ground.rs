//! # Ground Station Helpers
//!
//! Converts between received uplink payloads (as hex text) and JSON lines
//! in the geolocation-service access point shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::payload::decoder::decode_scan_batch;
use crate::payload::encoder::encode_scan_batch;
use crate::payload::protocol::ScanBatch;

/// A decoded uplink, ready to be written as one JSON line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedUplink {
    pub received_at: DateTime<Utc>,
    pub wifi_access_points: ScanBatch,
}

/// Decode a hex payload as shown by gateways and modem logs
///
/// Whitespace between digits and a leading `0x` are ignored, and digits may
/// be upper or lower case.
pub fn decode_hex_payload(text: &str) -> Result<ScanBatch> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits.as_str());

    let payload = hex::decode(digits)?;
    Ok(decode_scan_batch(&payload)?)
}

/// Decode a hex payload into a JSON line stamped with `received_at`
pub fn decode_hex_line(text: &str, received_at: DateTime<Utc>) -> Result<String> {
    let uplink = DecodedUplink {
        received_at,
        wifi_access_points: decode_hex_payload(text)?,
    };
    Ok(serde_json::to_string(&uplink)?)
}

/// Encode a JSON array of access points into a lowercase hex payload
///
/// The input is one scan log line, e.g.
/// `[{"macAddress": "aa:dd:44:11:66:ff", "signalStrength": -23, "channel": 11}]`.
pub fn encode_json_line(line: &str, max_records: usize) -> Result<String> {
    let batch: ScanBatch = serde_json::from_str(line)?;
    let payload = encode_scan_batch(&batch, max_records)?;
    Ok(hex::encode(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::payload::protocol::AccessPointObservation;
    use chrono::TimeZone;

    #[test]
    fn test_decode_hex_payload() {
        let batch = decode_hex_payload("01aadd441166ffe90b").unwrap();
        assert_eq!(batch, vec![AccessPointObservation::try_new("aa:dd:44:11:66:ff", -23, 11).unwrap()]);
    }

    #[test]
    fn test_decode_hex_payload_tolerates_formatting() {
        let plain = decode_hex_payload("01aadd441166ffe90b").unwrap();
        assert_eq!(decode_hex_payload("0x01AADD441166FFE90B").unwrap(), plain);
        assert_eq!(decode_hex_payload(" 01 AA DD 44 11 66 FF E9 0B\n").unwrap(), plain);
    }

    #[test]
    fn test_decode_hex_payload_invalid_hex() {
        assert!(matches!(decode_hex_payload("01zz"), Err(TrackerError::Hex(_))));
        assert!(matches!(decode_hex_payload("012"), Err(TrackerError::Hex(_))));
    }

    #[test]
    fn test_decode_hex_payload_codec_error() {
        let result = decode_hex_payload("02aadd441166ffe90b");
        assert!(matches!(result, Err(TrackerError::Codec(_))));
    }

    #[test]
    fn test_decode_hex_line() {
        let received_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let line = decode_hex_line("01aadd441166ffe90b", received_at).unwrap();

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["receivedAt"], "2024-05-01T12:00:00Z");
        assert_eq!(
            value["wifiAccessPoints"],
            serde_json::json!([{"macAddress": "aa:dd:44:11:66:ff", "signalStrength": -23, "channel": 11}])
        );

        let parsed: DecodedUplink = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.received_at, received_at);
        assert_eq!(parsed.wifi_access_points.len(), 1);
    }

    #[test]
    fn test_encode_json_line() {
        let line = r#"[
            {"macAddress": "aa:bb:dd:bb:ff:00", "signalStrength": -23, "channel": 11},
            {"macAddress": "22:23:24:25:af:b2", "signalStrength": -99, "channel": 2}
        ]"#;

        assert_eq!(encode_json_line(line, 10).unwrap(), "02aabbddbbff00e90b22232425afb29d02");
        assert_eq!(encode_json_line(line, 1).unwrap(), "01aabbddbbff00e90b");
    }

    #[test]
    fn test_encode_json_line_ignores_extra_fields() {
        // Device scan logs also carry signalToNoiseRatio and age
        let line = r#"[{"macAddress": "aa:dd:44:11:66:ff", "signalStrength": -23, "signalToNoiseRatio": 0, "channel": 11, "age": 0}]"#;
        assert_eq!(encode_json_line(line, 10).unwrap(), "01aadd441166ffe90b");
    }

    #[test]
    fn test_encode_json_line_rejects_out_of_range() {
        let line = r#"[{"macAddress": "aa:dd:44:11:66:ff", "signalStrength": -230, "channel": 11}]"#;
        assert!(matches!(encode_json_line(line, 10), Err(TrackerError::Json(_))));
    }

    #[test]
    fn test_hex_round_trip_through_json() {
        let hex_payload = "03aabbddbbff00e90b22232425afb29d02000120557739f613";
        let batch = decode_hex_payload(hex_payload).unwrap();
        let json = serde_json::to_string(&batch).unwrap();
        assert_eq!(encode_json_line(&json, 10).unwrap(), hex_payload);
    }
}
