use serde::{Deserialize, Serialize};

/// Settings of the `avro-stream` output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub key: String,

    /// Schema id written into the 5-byte header of every message
    #[serde(default = "default_schema_id")]
    pub schema_id: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            key: String::new(),
            schema_id: default_schema_id(),
        }
    }
}

fn default_topic() -> String {
    "dns".to_string()
}

fn default_schema_id() -> u32 {
    3
}
