use serde::{Deserialize, Serialize};

use super::capture::CaptureConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::output::OutputConfig;
use super::parsing::ParsingConfig;
use super::stream::StreamConfig;
use crate::output_format::OutputFormat;

const LOCAL_CONFIG_PATH: &str = "ferrous-capture.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-capture/config.toml";

/// Main configuration structure for Ferrous Capture
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Capture source configuration (filter, snaplen)
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Record emission rules
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Output encoder and destination
    #[serde(default)]
    pub output: OutputConfig,

    /// Stream sink settings for the `avro-stream` format
    #[serde(default)]
    pub stream: StreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-capture.toml in current directory
    /// 3. /etc/ferrous-capture/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(filter) = overrides.bpf_filter {
            self.capture.bpf_filter = Some(filter);
        }
        if let Some(snaplen) = overrides.snaplen {
            self.capture.snaplen = snaplen;
        }
        if overrides.promiscuous {
            self.capture.promiscuous = true;
        }
        if overrides.include_tcp {
            self.parsing.include_tcp = true;
        }
        if overrides.questions {
            self.parsing.questions = true;
        }
        if overrides.questions_ecs {
            self.parsing.questions_ecs = true;
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if let Some(path) = overrides.output_path {
            self.output.path = Some(path);
        }
        if let Some(source) = overrides.source {
            self.output.source = source;
        }
        if let Some(sensor) = overrides.sensor {
            self.output.sensor = sensor;
        }
        if let Some(topic) = overrides.topic {
            self.stream.topic = topic;
        }
        if let Some(key) = overrides.key {
            self.stream.key = key;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Resolve the configured output format name
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        self.output
            .format
            .parse()
            .map_err(|e: crate::DomainError| ConfigError::Validation(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output_format()?;

        if self.capture.snaplen <= 0 {
            return Err(ConfigError::Validation(
                "Snapshot length must be positive".to_string(),
            ));
        }

        if !LoggingConfig::is_valid_level(&self.logging.level) {
            return Err(ConfigError::Validation(format!(
                "Invalid log level: \"{}\" not in {:?}",
                self.logging.level,
                super::logging::LOG_LEVELS
            )));
        }

        if let Some(filter) = &self.capture.bpf_filter {
            if filter.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "BPF filter cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bpf_filter: Option<String>,
    pub snaplen: Option<i32>,
    pub promiscuous: bool,
    pub include_tcp: bool,
    pub questions: bool,
    pub questions_ecs: bool,
    pub format: Option<String>,
    pub output_path: Option<String>,
    pub source: Option<String>,
    pub sensor: Option<String>,
    pub topic: Option<String>,
    pub key: Option<String>,
    pub log_level: Option<String>,
}
