mod avro;
mod avro_stream;
mod json;
mod schema;

pub use avro::AvroEncoder;
pub use avro_stream::{schema_header, AvroStreamEncoder};
pub use json::JsonEncoder;
pub use schema::{to_avro_value, DNS_RECORD_SCHEMA};

use crate::stream::{spawn_error_logger, FramedStreamSink};
use ferrous_capture_application::ports::RecordEncoder;
use ferrous_capture_domain::{Config, DomainError, OutputFormat};
use std::fs::File;
use std::io::Write;
use tokio::runtime::Handle;
use tracing::info;

/// Opens the output destination: the file at `path`, or stdout.
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write + Send>, DomainError> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| DomainError::IoError(format!("cannot create {}: {}", path, e)))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

/// Builds the encoder selected by `format`.
///
/// `runtime` hosts the stream writer and error logger tasks of the
/// `avro-stream` format.
pub fn build_encoder(
    format: OutputFormat,
    config: &Config,
    runtime: &Handle,
) -> Result<Box<dyn RecordEncoder>, DomainError> {
    let path = config.output.path.as_deref();
    info!(
        format = %format,
        output = path.unwrap_or("<stdout>"),
        "Output encoder selected"
    );

    let encoder: Box<dyn RecordEncoder> = match format {
        OutputFormat::Json => Box::new(JsonEncoder::new(open_output(path)?)),
        OutputFormat::Avro => Box::new(AvroEncoder::new(open_output(path)?)),
        OutputFormat::AvroStream => {
            let writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = match path {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        DomainError::IoError(format!("cannot create {}: {}", path, e))
                    })?;
                    Box::new(tokio::fs::File::from_std(file))
                }
                None => Box::new(tokio::io::stdout()),
            };
            let (sink, errors) = FramedStreamSink::spawn(writer, runtime.clone());
            spawn_error_logger(errors, runtime);
            Box::new(AvroStreamEncoder::new(Box::new(sink), &config.stream))
        }
    };

    Ok(encoder)
}
