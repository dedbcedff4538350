use apache_avro::types::Value;
use apache_avro::Schema;
use ferrous_capture_domain::{CaptureRecord, DomainError};
use serde::Serialize;
use std::sync::LazyLock;

const DNS_RECORD_SCHEMA_JSON: &str = r#"{
  "type": "record",
  "name": "DnsRecord",
  "namespace": "ferrous.capture",
  "fields": [
    { "name": "timestamp", "type": "long" },
    { "name": "sha256", "type": "string" },
    { "name": "udp", "type": "boolean" },
    { "name": "ipv4", "type": "boolean" },
    { "name": "src_address", "type": "string" },
    { "name": "src_port", "type": "int" },
    { "name": "dst_address", "type": "string" },
    { "name": "dst_port", "type": "int" },
    { "name": "id", "type": "int" },
    { "name": "rcode", "type": "int" },
    { "name": "truncated", "type": "boolean" },
    { "name": "response", "type": "boolean" },
    { "name": "recursion_desired", "type": "boolean" },
    { "name": "answer", "type": "boolean" },
    { "name": "authority", "type": "boolean" },
    { "name": "additional", "type": "boolean" },
    { "name": "qname", "type": "string" },
    { "name": "qtype", "type": "int" },
    { "name": "ttl", "type": ["null", "long"], "default": null },
    { "name": "rname", "type": ["null", "string"], "default": null },
    { "name": "rtype", "type": ["null", "int"], "default": null },
    { "name": "rdata", "type": ["null", "string"], "default": null },
    { "name": "ecs_client", "type": ["null", "string"], "default": null },
    { "name": "ecs_source", "type": ["null", "int"], "default": null },
    { "name": "ecs_scope", "type": ["null", "int"], "default": null },
    { "name": "source", "type": ["null", "string"], "default": null },
    { "name": "sensor", "type": ["null", "string"], "default": null }
  ]
}"#;

pub static DNS_RECORD_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::parse_str(DNS_RECORD_SCHEMA_JSON).expect("embedded Avro schema must be valid")
});

/// Avro view of a [`CaptureRecord`]: unsigned fields widened to the signed
/// Avro types, empty provenance labels written as null.
#[derive(Debug, Serialize)]
struct AvroRecord<'a> {
    timestamp: i64,
    sha256: &'a str,
    udp: bool,
    ipv4: bool,
    src_address: &'a str,
    src_port: i32,
    dst_address: &'a str,
    dst_port: i32,
    id: i32,
    rcode: i32,
    truncated: bool,
    response: bool,
    recursion_desired: bool,
    answer: bool,
    authority: bool,
    additional: bool,
    qname: &'a str,
    qtype: i32,
    ttl: Option<i64>,
    rname: Option<&'a str>,
    rtype: Option<i32>,
    rdata: Option<&'a str>,
    ecs_client: Option<&'a str>,
    ecs_source: Option<i32>,
    ecs_scope: Option<i32>,
    source: Option<&'a str>,
    sensor: Option<&'a str>,
}

impl<'a> From<&'a CaptureRecord> for AvroRecord<'a> {
    fn from(record: &'a CaptureRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            sha256: &record.sha256,
            udp: record.udp,
            ipv4: record.ipv4,
            src_address: &record.src_address,
            src_port: record.src_port.into(),
            dst_address: &record.dst_address,
            dst_port: record.dst_port.into(),
            id: record.id.into(),
            rcode: record.rcode,
            truncated: record.truncated,
            response: record.response,
            recursion_desired: record.recursion_desired,
            answer: record.answer,
            authority: record.authority,
            additional: record.additional,
            qname: &record.qname,
            qtype: record.qtype.into(),
            ttl: record.ttl.map(i64::from),
            rname: record.rname.as_deref(),
            rtype: record.rtype.map(i32::from),
            rdata: record.rdata.as_deref(),
            ecs_client: record.ecs_client.as_deref(),
            ecs_source: record.ecs_source.map(i32::from),
            ecs_scope: record.ecs_scope.map(i32::from),
            source: non_empty(&record.source),
            sensor: non_empty(&record.sensor),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Converts `record` to an Avro value resolved against [`DNS_RECORD_SCHEMA`].
pub fn to_avro_value(record: &CaptureRecord) -> Result<Value, DomainError> {
    apache_avro::to_value(AvroRecord::from(record))
        .and_then(|value| value.resolve(&DNS_RECORD_SCHEMA))
        .map_err(|e| DomainError::EncodeError(format!("Avro conversion failed: {}", e)))
}
