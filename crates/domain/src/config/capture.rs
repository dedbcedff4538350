use serde::{Deserialize, Serialize};

/// Capture source settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// BPF-style ingress filter, e.g. `"udp port 53"`
    #[serde(default)]
    pub bpf_filter: Option<String>,

    /// Snapshot length for live captures
    #[serde(default = "default_snaplen")]
    pub snaplen: i32,

    #[serde(default)]
    pub promiscuous: bool,

    /// Read timeout for live captures (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: i32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            bpf_filter: None,
            snaplen: default_snaplen(),
            promiscuous: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_snaplen() -> i32 {
    4096
}

fn default_timeout_ms() -> i32 {
    1000
}
