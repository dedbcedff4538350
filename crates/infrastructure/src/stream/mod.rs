mod framed_sink;

pub use framed_sink::{spawn_error_logger, FramedStreamSink};
