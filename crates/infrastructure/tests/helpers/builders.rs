#![allow(dead_code)]
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsOption};
use hickory_proto::rr::rdata::{A, CNAME, NS, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{IpAddr, Ipv6Addr};

pub const CLIENT_V4: [u8; 4] = [192, 168, 1, 100];
pub const RESOLVER_V4: [u8; 4] = [192, 168, 1, 1];
pub const CLIENT_PORT: u16 = 40000;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

// ── layer builders ───────────────────────────────────────────────────────────

pub fn udp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut segment = Vec::with_capacity(8 + payload.len());
    segment.extend_from_slice(&src_port.to_be_bytes());
    segment.extend_from_slice(&dst_port.to_be_bytes());
    segment.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    segment.extend_from_slice(&[0, 0]);
    segment.extend_from_slice(payload);
    segment
}

pub fn tcp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut segment = vec![0u8; 20];
    segment[0..2].copy_from_slice(&src_port.to_be_bytes());
    segment[2..4].copy_from_slice(&dst_port.to_be_bytes());
    segment[12] = 5 << 4;
    segment[13] = 0x18;
    segment.extend_from_slice(payload);
    segment
}

pub fn ipv4_packet(src: [u8; 4], dst: [u8; 4], protocol: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; 20];
    packet[0] = 0x45;
    packet[2..4].copy_from_slice(&((20 + payload.len()) as u16).to_be_bytes());
    packet[8] = 64;
    packet[9] = protocol;
    packet[12..16].copy_from_slice(&src);
    packet[16..20].copy_from_slice(&dst);
    packet.extend_from_slice(payload);
    packet
}

/// IPv4 packet with the fragment offset field set (in 8-byte units).
pub fn ipv4_fragment(protocol: u8, fragment_offset: u16, payload: &[u8]) -> Vec<u8> {
    let mut packet = ipv4_packet(RESOLVER_V4, CLIENT_V4, protocol, payload);
    packet[6..8].copy_from_slice(&(fragment_offset & 0x1FFF).to_be_bytes());
    packet
}

pub fn ipv6_packet(src: Ipv6Addr, dst: Ipv6Addr, next_header: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; 40];
    packet[0] = 0x60;
    packet[4..6].copy_from_slice(&(payload.len() as u16).to_be_bytes());
    packet[6] = next_header;
    packet[7] = 64;
    packet[8..24].copy_from_slice(&src.octets());
    packet[24..40].copy_from_slice(&dst.octets());
    packet.extend_from_slice(payload);
    packet
}

/// Prepends an 8-byte IPv6 extension header (hop-by-hop, routing or
/// destination options).
pub fn ipv6_extension(next_header: u8, rest: &[u8]) -> Vec<u8> {
    let mut header = vec![next_header, 0, 0, 0, 0, 0, 0, 0];
    header.extend_from_slice(rest);
    header
}

pub fn ipv6_fragment_header(next_header: u8, fragment_offset: u16, rest: &[u8]) -> Vec<u8> {
    let mut header = vec![next_header, 0];
    header.extend_from_slice(&(fragment_offset << 3).to_be_bytes());
    header.extend_from_slice(&[0, 0, 0, 1]);
    header.extend_from_slice(rest);
    header
}

pub fn ethernet_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    vlan_frame(&[], ethertype, payload)
}

pub fn vlan_frame(vlan_ids: &[u16], ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb];
    for (i, id) in vlan_ids.iter().enumerate() {
        let tpid: u16 = if i + 1 < vlan_ids.len() { 0x88A8 } else { 0x8100 };
        frame.extend_from_slice(&tpid.to_be_bytes());
        frame.extend_from_slice(&id.to_be_bytes());
    }
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn sll_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 14];
    frame[1] = 4;
    frame[3] = 1;
    frame.extend_from_slice(&ethertype.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn sll2_frame(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = ethertype.to_be_bytes().to_vec();
    frame.extend_from_slice(&[0u8; 18]);
    frame.extend_from_slice(payload);
    frame
}

/// DNS response from the resolver to the client over IPv4/UDP in Ethernet.
pub fn udp_dns_frame(dns: &[u8]) -> Vec<u8> {
    ethernet_frame(
        ETHERTYPE_IPV4,
        &ipv4_packet(
            RESOLVER_V4,
            CLIENT_V4,
            PROTO_UDP,
            &udp_segment(53, CLIENT_PORT, dns),
        ),
    )
}

/// DNS message over IPv4/TCP in Ethernet, with the two-byte length prefix.
pub fn tcp_dns_frame(dns: &[u8]) -> Vec<u8> {
    ethernet_frame(
        ETHERTYPE_IPV4,
        &ipv4_packet(
            RESOLVER_V4,
            CLIENT_V4,
            PROTO_TCP,
            &tcp_segment(53, CLIENT_PORT, &length_prefixed(dns)),
        ),
    )
}

pub fn length_prefixed(dns: &[u8]) -> Vec<u8> {
    let mut framed = (dns.len() as u16).to_be_bytes().to_vec();
    framed.extend_from_slice(dns);
    framed
}

// ── DNS messages ─────────────────────────────────────────────────────────────

pub fn name(value: &str) -> Name {
    Name::from_ascii(value).unwrap()
}

pub struct DnsWireBuilder {
    message: Message,
}

impl DnsWireBuilder {
    pub fn query(qname: &str, qtype: RecordType) -> Self {
        let mut message = Message::new();
        message
            .set_id(4242)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        message.add_query(Query::query(name(qname), qtype));
        Self { message }
    }

    pub fn response(qname: &str, qtype: RecordType) -> Self {
        let mut builder = Self::query(qname, qtype);
        builder
            .message
            .set_message_type(MessageType::Response)
            .set_recursion_available(true);
        builder
    }

    pub fn rcode(mut self, rcode: ResponseCode) -> Self {
        self.message.set_response_code(rcode);
        self
    }

    pub fn truncated(mut self) -> Self {
        self.message.set_truncated(true);
        self
    }

    pub fn extra_query(mut self, qname: &str, qtype: RecordType) -> Self {
        self.message.add_query(Query::query(name(qname), qtype));
        self
    }

    pub fn edns(mut self) -> Self {
        self.message.set_edns(Edns::new());
        self
    }

    pub fn ecs(mut self, client: &str, source_prefix: u8, scope_prefix: u8) -> Self {
        let mut edns = Edns::new();
        edns.options_mut().insert(EdnsOption::Subnet(ClientSubnet::new(
            client.parse::<IpAddr>().unwrap(),
            source_prefix,
            scope_prefix,
        )));
        self.message.set_edns(edns);
        self
    }

    pub fn answer_a(mut self, owner: &str, ttl: u32, ip: [u8; 4]) -> Self {
        self.message.add_answer(Record::from_rdata(
            name(owner),
            ttl,
            RData::A(A::new(ip[0], ip[1], ip[2], ip[3])),
        ));
        self
    }

    pub fn answer_cname(mut self, owner: &str, ttl: u32, target: &str) -> Self {
        self.message.add_answer(Record::from_rdata(
            name(owner),
            ttl,
            RData::CNAME(CNAME(name(target))),
        ));
        self
    }

    pub fn answer_txt(mut self, owner: &str, ttl: u32, strings: &[&[u8]]) -> Self {
        self.message.add_answer(Record::from_rdata(
            name(owner),
            ttl,
            RData::TXT(TXT::from_bytes(strings.to_vec())),
        ));
        self
    }

    pub fn authority_ns(mut self, owner: &str, ttl: u32, target: &str) -> Self {
        self.message.add_name_server(Record::from_rdata(
            name(owner),
            ttl,
            RData::NS(NS(name(target))),
        ));
        self
    }

    pub fn authority_soa(mut self, owner: &str, ttl: u32) -> Self {
        self.message.add_name_server(Record::from_rdata(
            name(owner),
            ttl,
            RData::SOA(SOA::new(
                name("ns1.example.com."),
                name("hostmaster.example.com."),
                2024010101,
                7200,
                3600,
                1209600,
                300,
            )),
        ));
        self
    }

    pub fn additional_a(mut self, owner: &str, ttl: u32, ip: [u8; 4]) -> Self {
        self.message.add_additional(Record::from_rdata(
            name(owner),
            ttl,
            RData::A(A::new(ip[0], ip[1], ip[2], ip[3])),
        ));
        self
    }

    pub fn to_wire(&self) -> Vec<u8> {
        self.message.to_vec().unwrap()
    }
}
