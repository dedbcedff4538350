use ferrous_capture_domain::{CaptureRecord, DomainError};

/// Serializes capture records to an output.
///
/// `init` is called once before the first record and `close` once after the
/// last one.
pub trait RecordEncoder: Send {
    fn init(&mut self) -> Result<(), DomainError> {
        Ok(())
    }

    fn encode(&mut self, record: &CaptureRecord) -> Result<(), DomainError>;

    fn close(&mut self) -> Result<(), DomainError> {
        Ok(())
    }
}
