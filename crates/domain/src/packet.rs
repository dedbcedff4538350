use chrono::{DateTime, Utc};
use std::fmt;
use std::net::IpAddr;

/// Link-layer framing of a capture, identified by its libpcap DLT number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    /// BSD loopback (DLT_NULL = 0, DLT_LOOP = 108): 4-byte address family header.
    Null,
    /// Ethernet (DLT_EN10MB = 1): 14-byte header, EtherType at offset 12.
    Ethernet,
    /// Raw IP (DLT_RAW = 12/14/101, LINKTYPE_IPV4 = 228, LINKTYPE_IPV6 = 229).
    Raw,
    /// Linux cooked capture v1 (DLT_LINUX_SLL = 113): 16-byte header.
    LinuxSll,
    /// Linux cooked capture v2 (DLT_LINUX_SLL2 = 276): 20-byte header.
    LinuxSll2,
    Unknown(i32),
}

impl LinkType {
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            0 | 108 => LinkType::Null,
            1 => LinkType::Ethernet,
            12 | 14 | 101 | 228 | 229 => LinkType::Raw,
            113 => LinkType::LinuxSll,
            276 => LinkType::LinuxSll2,
            other => LinkType::Unknown(other),
        }
    }

    /// DLT number to hand back to libpcap.
    pub fn dlt(&self) -> i32 {
        match self {
            LinkType::Null => 0,
            LinkType::Ethernet => 1,
            LinkType::Raw => 12,
            LinkType::LinuxSll => 113,
            LinkType::LinuxSll2 => 276,
            LinkType::Unknown(dlt) => *dlt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Null => "NULL",
            LinkType::Ethernet => "EN10MB",
            LinkType::Raw => "RAW",
            LinkType::LinuxSll => "LINUX_SLL",
            LinkType::LinuxSll2 => "LINUX_SLL2",
            LinkType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Unknown(dlt) => write!(f, "UNKNOWN({})", dlt),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One packet as handed over by a capture source.
///
/// `data` borrows the source's scratch buffer and is only valid until the
/// next read from that source.
#[derive(Debug, Clone, Copy)]
pub struct CapturedPacket<'a> {
    pub data: &'a [u8],
    pub link_type: LinkType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkLayer {
    None,
    Ipv4 { src: IpAddr, dst: IpAddr },
    Ipv6 { src: IpAddr, dst: IpAddr },
}

impl NetworkLayer {
    pub fn is_ipv4(&self) -> bool {
        matches!(self, NetworkLayer::Ipv4 { .. })
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, NetworkLayer::Ipv6 { .. })
    }

    pub fn addresses(&self) -> Option<(IpAddr, IpAddr)> {
        match self {
            NetworkLayer::Ipv4 { src, dst } | NetworkLayer::Ipv6 { src, dst } => Some((*src, *dst)),
            NetworkLayer::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportLayer<'a> {
    None,
    /// A transport header was present but is neither TCP nor UDP.
    Other(u8),
    Udp {
        src_port: u16,
        dst_port: u16,
        payload: &'a [u8],
    },
    Tcp {
        src_port: u16,
        dst_port: u16,
        payload: &'a [u8],
    },
}

impl<'a> TransportLayer<'a> {
    pub fn kind(&self) -> Option<Transport> {
        match self {
            TransportLayer::Udp { .. } => Some(Transport::Udp),
            TransportLayer::Tcp { .. } => Some(Transport::Tcp),
            TransportLayer::None | TransportLayer::Other(_) => None,
        }
    }

    pub fn ports(&self) -> Option<(u16, u16)> {
        match self {
            TransportLayer::Udp {
                src_port, dst_port, ..
            }
            | TransportLayer::Tcp {
                src_port, dst_port, ..
            } => Some((*src_port, *dst_port)),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&'a [u8]> {
        match self {
            TransportLayer::Udp { payload, .. } | TransportLayer::Tcp { payload, .. } => {
                Some(*payload)
            }
            _ => None,
        }
    }
}

/// Result of demultiplexing one packet's link, network and transport layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket<'a> {
    pub network: NetworkLayer,
    pub transport: TransportLayer<'a>,
}
