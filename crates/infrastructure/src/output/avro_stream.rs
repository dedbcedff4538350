use super::schema::{to_avro_value, DNS_RECORD_SCHEMA};
use apache_avro::to_avro_datum;
use ferrous_capture_application::ports::{RecordEncoder, StreamMessage, StreamSink};
use ferrous_capture_domain::config::StreamConfig;
use ferrous_capture_domain::{CaptureRecord, DomainError};

const MAGIC_BYTE: u8 = 0;
const HEADER_LEN: usize = 5;

/// Hands single Avro datums to a stream sink, each prefixed with the magic
/// byte and the big-endian schema id.
pub struct AvroStreamEncoder {
    sink: Box<dyn StreamSink>,
    topic: String,
    key: Vec<u8>,
    header: [u8; HEADER_LEN],
}

impl AvroStreamEncoder {
    pub fn new(sink: Box<dyn StreamSink>, config: &StreamConfig) -> Self {
        Self {
            sink,
            topic: config.topic.clone(),
            key: config.key.as_bytes().to_vec(),
            header: schema_header(config.schema_id),
        }
    }
}

pub fn schema_header(schema_id: u32) -> [u8; HEADER_LEN] {
    let id = schema_id.to_be_bytes();
    [MAGIC_BYTE, id[0], id[1], id[2], id[3]]
}

impl RecordEncoder for AvroStreamEncoder {
    fn encode(&mut self, record: &CaptureRecord) -> Result<(), DomainError> {
        let datum = to_avro_datum(&DNS_RECORD_SCHEMA, to_avro_value(record)?)
            .map_err(|e| DomainError::EncodeError(format!("Avro datum failed: {}", e)))?;

        let mut payload = Vec::with_capacity(HEADER_LEN + datum.len());
        payload.extend_from_slice(&self.header);
        payload.extend_from_slice(&datum);

        self.sink.submit(StreamMessage {
            topic: self.topic.clone(),
            key: self.key.clone(),
            payload,
        })
    }

    fn close(&mut self) -> Result<(), DomainError> {
        self.sink.close()
    }
}
