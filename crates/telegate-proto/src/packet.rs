use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtoError, Result};

/// Handshake sentinel sent by the device before any data message.
pub const HELLO_SENTINEL: &str = "HELLO";

/// Message type string for status telemetry.
pub const TYPE_STATUS: &str = "STATUS";
/// Message type string for fault reports.
pub const TYPE_FAULT: &str = "FAULT";
/// Message type string for acknowledgments.
pub const TYPE_ACK: &str = "ACK";

/// Classification of a decoded packet by its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Status,
    Fault,
    Ack,
    /// Missing or unrecognized `type`. Relayed untouched, never ACKed.
    Other,
}

/// A decoded wire message: a JSON object, immutable once decoded.
///
/// Every field present in the input is preserved verbatim — the gateway
/// echoes structure rather than selecting fields it understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Packet {
    fields: Map<String, Value>,
}

impl Packet {
    /// Build a packet from raw fields. Used for ACK construction.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Classify by the `type` field.
    pub fn kind(&self) -> PacketKind {
        match self.fields.get("type").and_then(Value::as_str) {
            Some(TYPE_STATUS) => PacketKind::Status,
            Some(TYPE_FAULT) => PacketKind::Fault,
            Some(TYPE_ACK) => PacketKind::Ack,
            _ => PacketKind::Other,
        }
    }

    /// The sequence number, when present as an integer.
    pub fn seq(&self) -> Option<i64> {
        self.fields.get("seq").and_then(Value::as_i64)
    }

    /// Look up an arbitrary field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields, in decode order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// One decoded line of the device wire protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// The `HELLO` handshake sentinel. Logged, never relayed or ACKed.
    Hello,
    /// A data message.
    Packet(Packet),
}

/// Decode one framed line.
///
/// The literal line `HELLO` is the handshake sentinel. Anything else must
/// parse as a JSON object; otherwise `ProtoError::NonJson` carries the
/// line (lossily UTF-8 decoded) for logging.
pub fn decode(line: &[u8]) -> Result<Line> {
    if line == HELLO_SENTINEL.as_bytes() {
        return Ok(Line::Hello);
    }

    match serde_json::from_slice::<Value>(line) {
        Ok(Value::Object(fields)) => Ok(Line::Packet(Packet { fields })),
        _ => Err(ProtoError::NonJson(
            String::from_utf8_lossy(line).into_owned(),
        )),
    }
}

/// Serialize a packet to a compact single line terminated by `\n`.
pub fn encode(packet: &Packet) -> Vec<u8> {
    // Map serialization cannot fail: keys are strings, values are Value.
    let mut out = serde_json::to_vec(&packet.fields).unwrap_or_default();
    out.push(b'\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_is_sentinel_not_data() {
        assert_eq!(decode(b"HELLO").unwrap(), Line::Hello);
    }

    #[test]
    fn hello_with_extra_text_is_not_sentinel() {
        let err = decode(b"HELLO THERE").unwrap_err();
        assert!(matches!(err, ProtoError::NonJson(s) if s == "HELLO THERE"));
    }

    #[test]
    fn decode_status_classifies_and_reads_seq() {
        let line = br#"{"type":"STATUS","seq":7,"state":"RUN","distance_cm":12.5}"#;
        let Line::Packet(pkt) = decode(line).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(pkt.kind(), PacketKind::Status);
        assert_eq!(pkt.seq(), Some(7));
        assert_eq!(pkt.field("state").and_then(Value::as_str), Some("RUN"));
    }

    #[test]
    fn decode_fault() {
        let Line::Packet(pkt) = decode(br#"{"type":"FAULT","seq":3,"code":17}"#).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(pkt.kind(), PacketKind::Fault);
        assert_eq!(pkt.field("code").and_then(Value::as_i64), Some(17));
    }

    #[test]
    fn unknown_type_is_other() {
        let Line::Packet(pkt) = decode(br#"{"type":"BANANA","seq":1}"#).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(pkt.kind(), PacketKind::Other);

        let Line::Packet(pkt) = decode(br#"{"seq":1}"#).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(pkt.kind(), PacketKind::Other);
    }

    #[test]
    fn non_json_carries_input_verbatim() {
        let err = decode(b"not json at all").unwrap_err();
        assert!(matches!(err, ProtoError::NonJson(s) if s == "not json at all"));
    }

    #[test]
    fn json_scalar_is_rejected() {
        assert!(decode(b"42").is_err());
        assert!(decode(b"[1,2,3]").is_err());
        assert!(decode(b"\"STATUS\"").is_err());
    }

    #[test]
    fn non_integer_seq_is_ignored() {
        let Line::Packet(pkt) = decode(br#"{"type":"STATUS","seq":"seven"}"#).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(pkt.seq(), None);
    }

    #[test]
    fn encode_preserves_every_field() {
        let line = br#"{"type":"STATUS","seq":9,"state":"IDLE","speed_rpm":0,"custom":[1,2]}"#;
        let Line::Packet(pkt) = decode(line).unwrap() else {
            panic!("expected packet");
        };
        let encoded = encode(&pkt);
        assert_eq!(*encoded.last().unwrap(), b'\n');

        let Line::Packet(reparsed) = decode(&encoded[..encoded.len() - 1]).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(reparsed, pkt);
        assert_eq!(reparsed.fields().len(), 5);
    }

    #[test]
    fn encode_is_compact() {
        let Line::Packet(pkt) = decode(br#"{ "type" : "ACK" , "ack" : 7 }"#).unwrap() else {
            panic!("expected packet");
        };
        assert_eq!(encode(&pkt), b"{\"type\":\"ACK\",\"ack\":7}\n");
    }
}
