use bytes::{Bytes, BytesMut};

use crate::codec::{decode_line, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Stateful byte-stream-to-line decoder for one connection.
///
/// Owns the pending-bytes buffer: [`feed`](Self::feed) appends a read
/// chunk, [`next_line`](Self::next_line) drains complete lines. The
/// buffer persists across calls for the life of the connection, so chunk
/// boundaries never affect the extracted line sequence.
pub struct LineFramer {
    buf: BytesMut,
    config: FrameConfig,
}

impl LineFramer {
    /// Create a framer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a framer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append a chunk of raw bytes from the peer.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete line, without its delimiter.
    ///
    /// Returns `Ok(None)` when no delimiter is buffered. Fails with
    /// `FrameError::LineTooLong` when the unterminated buffer exceeds
    /// the configured bound.
    pub fn next_line(&mut self) -> Result<Option<Bytes>> {
        let result = decode_line(&mut self.buf, self.config.max_line_len);
        if let Err(ref err) = result {
            tracing::warn!(pending = self.buf.len(), "framing failed: {err}");
        }
        result
    }

    /// Number of bytes buffered but not yet forming a complete line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Discard all buffered bytes. Used on connection teardown.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
