//! Newline-delimited framing for the telegate wire protocol.
//!
//! The wire format is UTF-8 text: one message per line, terminated by `\n`.
//! This crate turns an unbounded byte stream into discrete lines:
//! - [`decode_line`] / [`encode_line`] operate on a caller-owned buffer
//! - [`LineFramer`] owns the pending-bytes buffer for one connection
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod framer;

pub use codec::{decode_line, encode_line, FrameConfig, DEFAULT_MAX_LINE_LEN, DELIMITER};
pub use error::{FrameError, Result};
pub use framer::LineFramer;
