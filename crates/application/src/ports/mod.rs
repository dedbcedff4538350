mod capture_source;
mod dns_parser;
mod packet_decoder;
mod record_encoder;
mod stream_sink;

pub use capture_source::CaptureSource;
pub use dns_parser::DnsParser;
pub use packet_decoder::PacketDecoder;
pub use record_encoder::RecordEncoder;
pub use stream_sink::{StreamMessage, StreamSink};
