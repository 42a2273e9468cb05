//! Wire payload codec and acknowledgment policy for telegate.
//!
//! Every data message is a compact single-line JSON object classified by
//! its `type` field. The literal line `HELLO` is a handshake sentinel.
//! Decoding preserves every field of the input; unknown types are carried
//! through untouched.

pub mod ack;
pub mod error;
pub mod packet;

pub use ack::ack_for;
pub use error::{ProtoError, Result};
pub use packet::{decode, encode, Line, Packet, PacketKind, HELLO_SENTINEL};
