use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Could not decode network or transport layer: {0}")]
    UndecodablePacket(String),

    #[error("Could not decode DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Unsupported transport protocol: {0}")]
    UnsupportedTransport(u8),

    #[error("Unknown output format: {0}")]
    UnknownOutputFormat(String),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("Failed to open capture source {source_name}: {reason}")]
    CaptureOpen { source_name: String, reason: String },

    #[error("Capture read error: {0}")]
    CaptureRead(String),

    #[error("Encoding error: {0}")]
    EncodeError(String),

    #[error("Stream sink error: {0}")]
    SinkError(String),

    #[error("Encoder used before initialization")]
    EncoderNotInitialized,

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
