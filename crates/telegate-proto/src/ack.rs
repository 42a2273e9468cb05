use serde_json::{Map, Value};

use crate::packet::{Packet, PacketKind, TYPE_ACK};

/// Decide whether an inbound device message owes an acknowledgment.
///
/// An ACK is owed iff the message carries an integer `seq` AND its type
/// is `STATUS` or `FAULT`. The ACK payload is `{"type":"ACK","ack":seq}`.
/// The session writes it to the device before relaying the message and
/// before any fault-injection delay, so the device is unblocked promptly
/// even when the controller-bound path is being throttled.
pub fn ack_for(packet: &Packet) -> Option<Packet> {
    let seq = packet.seq()?;
    match packet.kind() {
        PacketKind::Status | PacketKind::Fault => {
            let mut fields = Map::new();
            fields.insert("type".to_string(), Value::from(TYPE_ACK));
            fields.insert("ack".to_string(), Value::from(seq));
            Some(Packet::from_fields(fields))
        }
        PacketKind::Ack | PacketKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{decode, encode, Line};

    fn packet(line: &[u8]) -> Packet {
        match decode(line).unwrap() {
            Line::Packet(pkt) => pkt,
            Line::Hello => panic!("unexpected sentinel"),
        }
    }

    #[test]
    fn status_with_seq_is_acked() {
        let ack = ack_for(&packet(br#"{"type":"STATUS","seq":7,"state":"RUN"}"#)).unwrap();
        assert_eq!(encode(&ack), b"{\"type\":\"ACK\",\"ack\":7}\n");
    }

    #[test]
    fn fault_with_seq_is_acked() {
        let ack = ack_for(&packet(br#"{"type":"FAULT","seq":12,"code":3}"#)).unwrap();
        assert_eq!(encode(&ack), b"{\"type\":\"ACK\",\"ack\":12}\n");
    }

    #[test]
    fn status_without_seq_is_not_acked() {
        assert!(ack_for(&packet(br#"{"type":"STATUS","state":"RUN"}"#)).is_none());
    }

    #[test]
    fn other_type_with_seq_is_not_acked() {
        assert!(ack_for(&packet(br#"{"type":"OTHER","seq":3}"#)).is_none());
    }

    #[test]
    fn ack_type_is_never_acked() {
        assert!(ack_for(&packet(br#"{"type":"ACK","ack":1,"seq":2}"#)).is_none());
    }

    #[test]
    fn non_integer_seq_is_not_acked() {
        assert!(ack_for(&packet(br#"{"type":"STATUS","seq":"7"}"#)).is_none());
    }
}
