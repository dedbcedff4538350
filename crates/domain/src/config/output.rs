use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,

    /// Destination file; stdout when unset
    #[serde(default)]
    pub path: Option<String>,

    /// Name of the source the traffic was collected from
    #[serde(default)]
    pub source: String,

    /// Name of the sensor the traffic was collected on
    #[serde(default)]
    pub sensor: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            path: None,
            source: String::new(),
            sensor: String::new(),
        }
    }
}

fn default_format() -> String {
    "json".to_string()
}
