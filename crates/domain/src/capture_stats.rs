use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-run packet counters. Written by the pipeline thread only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    #[serde(rename = "packetTotal")]
    pub total: u64,
    #[serde(rename = "packetIPv4")]
    pub ipv4: u64,
    #[serde(rename = "packetIPv6")]
    pub ipv6: u64,
    #[serde(rename = "packetTcp")]
    pub tcp: u64,
    #[serde(rename = "packetUdp")]
    pub udp: u64,
    #[serde(rename = "packetDns")]
    pub dns: u64,
    #[serde(rename = "packetErrors")]
    pub errors: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of TOTAL packets: {}", self.total)?;
        writeln!(f, "Number of IPv4 packets: {}", self.ipv4)?;
        writeln!(f, "Number of IPv6 packets: {}", self.ipv6)?;
        writeln!(f, "Number of UDP packets: {}", self.udp)?;
        writeln!(f, "Number of TCP packets: {}", self.tcp)?;
        writeln!(f, "Number of DNS packets: {}", self.dns)?;
        write!(f, "Number of FAILED packets: {}", self.errors)
    }
}
