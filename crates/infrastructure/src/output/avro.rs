use super::schema::{to_avro_value, DNS_RECORD_SCHEMA};
use apache_avro::{Codec, Writer};
use ferrous_capture_application::ports::RecordEncoder;
use ferrous_capture_domain::{CaptureRecord, DomainError};
use std::io::Write;

type Output = Box<dyn Write + Send>;

/// Writes an Avro object container file with Snappy-compressed blocks.
///
/// The writer is created on `init`; `close` flushes the last block.
pub struct AvroEncoder {
    output: Option<Output>,
    writer: Option<Writer<'static, Output>>,
}

impl AvroEncoder {
    pub fn new(output: Output) -> Self {
        Self {
            output: Some(output),
            writer: None,
        }
    }
}

impl RecordEncoder for AvroEncoder {
    fn init(&mut self) -> Result<(), DomainError> {
        let output = self.output.take().ok_or(DomainError::EncoderNotInitialized)?;
        let mut writer = Writer::with_codec(&DNS_RECORD_SCHEMA, output, Codec::Snappy);
        writer
            .add_user_metadata(
                "ferrous.capture.version".to_string(),
                env!("CARGO_PKG_VERSION"),
            )
            .map_err(|e| DomainError::EncodeError(e.to_string()))?;
        self.writer = Some(writer);
        Ok(())
    }

    fn encode(&mut self, record: &CaptureRecord) -> Result<(), DomainError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(DomainError::EncoderNotInitialized)?;
        writer
            .append(to_avro_value(record)?)
            .map_err(|e| DomainError::IoError(format!("Avro write failed: {}", e)))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let mut output = writer
            .into_inner()
            .map_err(|e| DomainError::IoError(format!("Avro flush failed: {}", e)))?;
        output.flush()?;
        Ok(())
    }
}
