use ferrous_capture_domain::{CapturedPacket, DomainError};

/// Producer of raw packets (capture file, live interface).
///
/// The returned packet borrows the source's scratch buffer and must be
/// dropped before the next call.
pub trait CaptureSource {
    /// Human readable name of the input, used in logs.
    fn name(&self) -> &str;

    /// `Ok(None)` signals end of input; `Err` a read failure.
    fn next_packet(&mut self) -> Result<Option<CapturedPacket<'_>>, DomainError>;
}
