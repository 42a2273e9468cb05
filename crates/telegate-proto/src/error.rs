/// Errors that can occur while decoding wire payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The line is not a JSON object. Carries the offending text so the
    /// caller can log it verbatim before dropping the message.
    #[error("non-JSON payload: {0}")]
    NonJson(String),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
