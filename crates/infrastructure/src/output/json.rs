use ferrous_capture_application::ports::RecordEncoder;
use ferrous_capture_domain::{CaptureRecord, DomainError};
use std::io::{BufWriter, Write};

/// Writes one JSON object per line.
pub struct JsonEncoder<W: Write + Send> {
    writer: BufWriter<W>,
}

impl<W: Write + Send> JsonEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }
}

impl<W: Write + Send> RecordEncoder for JsonEncoder<W> {
    fn encode(&mut self, record: &CaptureRecord) -> Result<(), DomainError> {
        serde_json::to_writer(&mut self.writer, record).map_err(|e| {
            if e.is_io() {
                DomainError::IoError(e.to_string())
            } else {
                DomainError::EncodeError(format!("JSON serialization failed: {}", e))
            }
        })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        self.writer.flush()?;
        Ok(())
    }
}
