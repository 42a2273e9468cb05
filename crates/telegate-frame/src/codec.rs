use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Line delimiter: `\n` (0x0A).
pub const DELIMITER: u8 = b'\n';

/// Default maximum length of an unterminated line: 64 KiB.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Configuration for the line codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum bytes the buffer may hold without a delimiter before the
    /// connection is failed. Default: 64 KiB.
    pub max_line_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

/// Decode one line from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete line yet.
/// On success, consumes the line and its delimiter from the buffer and
/// returns the line without the delimiter. A trailing `\r` is trimmed;
/// interior whitespace is untouched. An empty line is returned as empty
/// `Bytes` — callers skip it, but the delimiter is still consumed.
pub fn decode_line(src: &mut BytesMut, max_line_len: usize) -> Result<Option<Bytes>> {
    let Some(pos) = src.iter().position(|&b| b == DELIMITER) else {
        if src.len() > max_line_len {
            return Err(FrameError::LineTooLong {
                size: src.len(),
                max: max_line_len,
            });
        }
        return Ok(None); // Need more data
    };

    let mut line = src.split_to(pos);
    src.advance(1); // delimiter
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }

    Ok(Some(line.freeze()))
}

/// Append a payload and delimiter to the buffer.
pub fn encode_line(payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(payload.len() + 1);
    dst.put_slice(payload);
    dst.put_u8(DELIMITER);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_line() {
        let mut buf = BytesMut::from(&b"{\"a\":1}\n"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        assert_eq!(line.as_ref(), b"{\"a\":1}");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_incomplete_returns_none() {
        let mut buf = BytesMut::from(&b"{\"a\":1"[..]);
        let result = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 6); // untouched
    }

    #[test]
    fn decode_multiple_lines() {
        let mut buf = BytesMut::from(&b"first\nsecond\n"[..]);
        let l1 = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        let l2 = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        assert_eq!(l1.as_ref(), b"first");
        assert_eq!(l2.as_ref(), b"second");
        assert!(buf.is_empty());
        assert!(decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().is_none());
    }

    #[test]
    fn decode_empty_line_consumes_delimiter() {
        let mut buf = BytesMut::from(&b"\nrest"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        assert!(line.is_empty());
        assert_eq!(buf.as_ref(), b"rest");
    }

    #[test]
    fn decode_trims_trailing_cr_only() {
        let mut buf = BytesMut::from(&b"a\tb \r\n"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        assert_eq!(line.as_ref(), b"a\tb ");
    }

    #[test]
    fn decode_unterminated_over_bound_fails() {
        let mut buf = BytesMut::from(vec![b'x'; 32].as_slice());
        let err = decode_line(&mut buf, 16).unwrap_err();
        assert!(matches!(err, FrameError::LineTooLong { size: 32, max: 16 }));
    }

    #[test]
    fn decode_terminated_line_over_bound_still_extracted() {
        // The bound guards unterminated growth; a complete line drains the buffer.
        let mut data = vec![b'x'; 32];
        data.push(DELIMITER);
        let mut buf = BytesMut::from(data.as_slice());
        let line = decode_line(&mut buf, 16).unwrap().unwrap();
        assert_eq!(line.len(), 32);
    }

    #[test]
    fn encode_appends_delimiter() {
        let mut buf = BytesMut::new();
        encode_line(b"{\"type\":\"ACK\",\"ack\":7}", &mut buf);
        assert_eq!(buf.as_ref(), b"{\"type\":\"ACK\",\"ack\":7}\n");
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        encode_line(b"HELLO", &mut buf);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LEN).unwrap().unwrap();
        assert_eq!(line.as_ref(), b"HELLO");
        assert!(buf.is_empty());
    }
}
