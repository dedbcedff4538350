pub mod fingerprint;
pub mod record_builder;

pub use fingerprint::fingerprint;
pub use record_builder::{rdata_text, PacketMetadata, RecordBuilder};
