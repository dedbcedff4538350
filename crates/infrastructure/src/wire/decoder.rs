use super::link::{strip_link_layer, ETHERTYPE_IPV4, ETHERTYPE_IPV6};
use ferrous_capture_application::ports::PacketDecoder;
use ferrous_capture_domain::{
    CapturedPacket, DecodedPacket, DomainError, LinkType, NetworkLayer, TransportLayer,
};
use smallvec::SmallVec;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const IPV4_MIN_HEADER_LEN: usize = 20;
const IPV6_HEADER_LEN: usize = 40;
const UDP_HEADER_LEN: usize = 8;
const TCP_MIN_HEADER_LEN: usize = 20;

const PROTO_HOP_BY_HOP: u8 = 0;
const PROTO_TCP: u8 = 6;
const PROTO_UDP: u8 = 17;
const PROTO_ROUTING: u8 = 43;
const PROTO_FRAGMENT: u8 = 44;
const PROTO_AH: u8 = 51;
const PROTO_DEST_OPTS: u8 = 60;

const MAX_EXTENSION_HEADERS: usize = 8;

/// Everything the decoder learned about one frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame<'a> {
    pub packet: DecodedPacket<'a>,
    /// VLAN ids in the order the tags appear on the wire.
    pub vlan_ids: SmallVec<[u16; 2]>,
    /// IP protocol number of the transport header, when one was located.
    pub ip_protocol: Option<u8>,
}

/// Link/network/transport demultiplexer for captured frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireDecoder;

impl WireDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl PacketDecoder for WireDecoder {
    fn decode<'a>(&self, packet: &CapturedPacket<'a>) -> Result<DecodedPacket<'a>, DomainError> {
        decode_frame(packet.data, packet.link_type).map(|frame| frame.packet)
    }
}

/// Decodes `data` captured with `link_type`.
///
/// Layers that cannot be decoded are reported as absent. An error is returned
/// only when neither a network nor a transport layer was found.
pub fn decode_frame(data: &[u8], link_type: LinkType) -> Result<DecodedFrame<'_>, DomainError> {
    let link = strip_link_layer(data, link_type).ok_or_else(|| {
        DomainError::UndecodablePacket(format!(
            "unsupported or truncated {} frame of {} bytes",
            link_type,
            data.len()
        ))
    })?;
    let l3 = &data[link.offset..];

    let network = match link.ethertype {
        ETHERTYPE_IPV4 => decode_ipv4(l3),
        ETHERTYPE_IPV6 => decode_ipv6(l3),
        _ => None,
    };

    let Some(network) = network else {
        return Err(DomainError::UndecodablePacket(format!(
            "no IP layer behind ethertype {:#06x}",
            link.ethertype
        )));
    };

    let (transport, ip_protocol) = match network.transport {
        Some((protocol, segment)) => (decode_transport(protocol, segment), Some(protocol)),
        None => (TransportLayer::None, None),
    };

    Ok(DecodedFrame {
        packet: DecodedPacket {
            network: network.layer,
            transport,
        },
        vlan_ids: link.vlan_ids,
        ip_protocol,
    })
}

struct NetworkDecode<'a> {
    layer: NetworkLayer,
    /// Protocol number and bytes of the transport segment, absent for
    /// non-first fragments and truncated extension chains.
    transport: Option<(u8, &'a [u8])>,
}

fn decode_ipv4(buf: &[u8]) -> Option<NetworkDecode<'_>> {
    if buf.len() < IPV4_MIN_HEADER_LEN || buf[0] >> 4 != 4 {
        return None;
    }
    let header_len = ((buf[0] & 0x0F) as usize) * 4;
    if header_len < IPV4_MIN_HEADER_LEN || header_len > buf.len() {
        return None;
    }

    let total_len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    let end = if total_len >= header_len {
        total_len.min(buf.len())
    } else {
        buf.len()
    };
    let fragment_offset = u16::from_be_bytes([buf[6], buf[7]]) & 0x1FFF;
    let protocol = buf[9];
    let src = Ipv4Addr::new(buf[12], buf[13], buf[14], buf[15]);
    let dst = Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]);

    Some(NetworkDecode {
        layer: NetworkLayer::Ipv4 {
            src: IpAddr::V4(src),
            dst: IpAddr::V4(dst),
        },
        transport: (fragment_offset == 0).then(|| (protocol, &buf[header_len..end])),
    })
}

fn decode_ipv6(buf: &[u8]) -> Option<NetworkDecode<'_>> {
    if buf.len() < IPV6_HEADER_LEN || buf[0] >> 4 != 6 {
        return None;
    }

    let payload_len = u16::from_be_bytes([buf[4], buf[5]]) as usize;
    // Zero payload length means a jumbogram; fall back to the captured length.
    let end = if payload_len == 0 {
        buf.len()
    } else {
        (IPV6_HEADER_LEN + payload_len).min(buf.len())
    };
    let src = ipv6_at(buf, 8);
    let dst = ipv6_at(buf, 24);

    Some(NetworkDecode {
        layer: NetworkLayer::Ipv6 {
            src: IpAddr::V6(src),
            dst: IpAddr::V6(dst),
        },
        transport: walk_ipv6_extensions(buf[6], &buf[IPV6_HEADER_LEN..end]),
    })
}

fn ipv6_at(buf: &[u8], offset: usize) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets.copy_from_slice(&buf[offset..offset + 16]);
    Ipv6Addr::from(octets)
}

fn walk_ipv6_extensions(mut next_header: u8, mut rest: &[u8]) -> Option<(u8, &[u8])> {
    for _ in 0..MAX_EXTENSION_HEADERS {
        let header_len = match next_header {
            PROTO_HOP_BY_HOP | PROTO_ROUTING | PROTO_DEST_OPTS => {
                if rest.len() < 2 {
                    return None;
                }
                (rest[1] as usize + 1) * 8
            }
            PROTO_FRAGMENT => {
                if rest.len() < 8 {
                    return None;
                }
                let fragment_offset = u16::from_be_bytes([rest[2], rest[3]]) >> 3;
                if fragment_offset != 0 {
                    return None;
                }
                8
            }
            PROTO_AH => {
                if rest.len() < 2 {
                    return None;
                }
                (rest[1] as usize + 2) * 4
            }
            protocol => return Some((protocol, rest)),
        };

        if header_len > rest.len() {
            return None;
        }
        next_header = rest[0];
        rest = &rest[header_len..];
    }
    None
}

fn decode_transport(protocol: u8, segment: &[u8]) -> TransportLayer<'_> {
    match protocol {
        PROTO_UDP => decode_udp(segment),
        PROTO_TCP => decode_tcp(segment),
        other => TransportLayer::Other(other),
    }
}

fn decode_udp(segment: &[u8]) -> TransportLayer<'_> {
    if segment.len() < UDP_HEADER_LEN {
        return TransportLayer::None;
    }
    let length = u16::from_be_bytes([segment[4], segment[5]]) as usize;
    let end = if (UDP_HEADER_LEN..=segment.len()).contains(&length) {
        length
    } else {
        segment.len()
    };

    TransportLayer::Udp {
        src_port: u16::from_be_bytes([segment[0], segment[1]]),
        dst_port: u16::from_be_bytes([segment[2], segment[3]]),
        payload: &segment[UDP_HEADER_LEN..end],
    }
}

fn decode_tcp(segment: &[u8]) -> TransportLayer<'_> {
    if segment.len() < TCP_MIN_HEADER_LEN {
        return TransportLayer::None;
    }
    let data_offset = ((segment[12] >> 4) as usize) * 4;
    if data_offset < TCP_MIN_HEADER_LEN || data_offset > segment.len() {
        return TransportLayer::None;
    }

    TransportLayer::Tcp {
        src_port: u16::from_be_bytes([segment[0], segment[1]]),
        dst_port: u16::from_be_bytes([segment[2], segment[3]]),
        payload: &segment[data_offset..],
    }
}
