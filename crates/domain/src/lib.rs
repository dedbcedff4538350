//! Ferrous Capture Domain Layer
pub mod capture_record;
pub mod capture_stats;
pub mod config;
pub mod dns_message;
pub mod errors;
pub mod output_format;
pub mod packet;

pub use capture_record::{CaptureRecord, RecordData, RecordSection};
pub use capture_stats::CaptureStats;
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_message::{
    DnsMessage, EcsInfo, Question, ResourceRecordView, OPT_RECORD_TYPE, RCODE_NXDOMAIN,
};
pub use errors::DomainError;
pub use output_format::OutputFormat;
pub use packet::{CapturedPacket, DecodedPacket, LinkType, NetworkLayer, Transport, TransportLayer};
