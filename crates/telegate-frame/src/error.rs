/// Errors that can occur during line framing.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer holds more than the configured maximum without a delimiter.
    #[error("unterminated line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
