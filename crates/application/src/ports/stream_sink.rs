use ferrous_capture_domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage {
    pub topic: String,
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
}

/// Fire-and-forget message sink.
///
/// `submit` only fails when the sink can no longer accept messages. Delivery
/// failures are reported asynchronously by the implementation.
pub trait StreamSink: Send {
    fn submit(&self, message: StreamMessage) -> Result<(), DomainError>;

    /// Stops accepting messages and waits until queued ones are delivered.
    fn close(&mut self) -> Result<(), DomainError>;
}
