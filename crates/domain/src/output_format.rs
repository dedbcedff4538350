use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;

/// Registered output encoders, selected once at start-up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// One JSON object per line.
    Json,
    /// Avro object container file with Snappy-compressed blocks.
    Avro,
    /// Schema-id framed Avro datums handed to a stream sink.
    AvroStream,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Json,
        OutputFormat::Avro,
        OutputFormat::AvroStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Avro => "avro",
            OutputFormat::AvroStream => "avro-stream",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|format| format.as_str()).collect()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "avro" => Ok(OutputFormat::Avro),
            "avro-stream" | "avro_stream" => Ok(OutputFormat::AvroStream),
            _ => Err(DomainError::UnknownOutputFormat(format!(
                "\"{}\" not in {:?}",
                s,
                Self::names()
            ))),
        }
    }
}
