pub mod capture;
pub mod errors;
pub mod logging;
pub mod output;
pub mod parsing;
pub mod root;
pub mod stream;

pub use capture::CaptureConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use output::OutputConfig;
pub use parsing::ParsingConfig;
pub use root::{CliOverrides, Config};
pub use stream::StreamConfig;
