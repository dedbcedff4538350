#![allow(dead_code)]
use super::builders::MockRecord;
use chrono::{TimeZone, Utc};
use ferrous_capture_application::ports::{CaptureSource, DnsParser, PacketDecoder, RecordEncoder};
use ferrous_capture_domain::{
    CaptureRecord, CapturedPacket, DecodedPacket, DnsMessage, DomainError, LinkType,
    NetworkLayer, Transport, TransportLayer,
};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

pub const CLIENT_IP: &str = "192.168.1.100";
pub const RESOLVER_IP: &str = "192.168.1.1";
pub const CLIENT_PORT: u16 = 40000;

/// Frame layout understood by [`MockPacketDecoder`]: first byte selects the
/// layers, the rest is the transport payload.
pub mod frame {
    pub const UNDECODABLE: u8 = 0;
    pub const IPV4_UDP: u8 = 4;
    pub const IPV6_UDP: u8 = 6;
    pub const IPV4_TCP: u8 = 7;
    pub const IPV4_ICMP: u8 = 1;
    pub const IPV4_ONLY: u8 = 2;

    pub fn build(kind: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![kind];
        data.extend_from_slice(payload);
        data
    }
}

// ── capture source ───────────────────────────────────────────────────────────

pub enum MockRead {
    Packet(Vec<u8>),
    Error(String),
}

pub struct MockCaptureSource {
    name: String,
    reads: VecDeque<MockRead>,
    scratch: Vec<u8>,
    timestamp_secs: i64,
}

impl MockCaptureSource {
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        Self {
            name: "mock".to_string(),
            reads: frames.into_iter().map(MockRead::Packet).collect(),
            scratch: Vec::new(),
            timestamp_secs: 1_700_000_000,
        }
    }

    pub fn with_reads(reads: Vec<MockRead>) -> Self {
        Self {
            reads: reads.into(),
            ..Self::new(vec![])
        }
    }

    pub fn remaining(&self) -> usize {
        self.reads.len()
    }
}

impl CaptureSource for MockCaptureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_packet(&mut self) -> Result<Option<CapturedPacket<'_>>, DomainError> {
        match self.reads.pop_front() {
            None => Ok(None),
            Some(MockRead::Error(reason)) => Err(DomainError::CaptureRead(reason)),
            Some(MockRead::Packet(data)) => {
                self.scratch = data;
                Ok(Some(CapturedPacket {
                    data: &self.scratch,
                    link_type: LinkType::Raw,
                    timestamp: Utc.timestamp_opt(self.timestamp_secs, 0).unwrap(),
                }))
            }
        }
    }
}

// ── packet decoder ───────────────────────────────────────────────────────────

pub struct MockPacketDecoder;

impl PacketDecoder for MockPacketDecoder {
    fn decode<'a>(&self, packet: &CapturedPacket<'a>) -> Result<DecodedPacket<'a>, DomainError> {
        let (kind, payload) = match packet.data.split_first() {
            Some((kind, payload)) => (*kind, payload),
            None => return Err(DomainError::UndecodablePacket("empty frame".to_string())),
        };
        let client: IpAddr = CLIENT_IP.parse().unwrap();
        let resolver: IpAddr = RESOLVER_IP.parse().unwrap();
        let v4 = NetworkLayer::Ipv4 {
            src: resolver,
            dst: client,
        };
        let udp = TransportLayer::Udp {
            src_port: 53,
            dst_port: CLIENT_PORT,
            payload,
        };

        let (network, transport) = match kind {
            frame::IPV4_UDP => (v4, udp),
            frame::IPV6_UDP => (
                NetworkLayer::Ipv6 {
                    src: "2001:db8::53".parse().unwrap(),
                    dst: "2001:db8::100".parse().unwrap(),
                },
                udp,
            ),
            frame::IPV4_TCP => (
                v4,
                TransportLayer::Tcp {
                    src_port: 53,
                    dst_port: CLIENT_PORT,
                    payload,
                },
            ),
            frame::IPV4_ICMP => (v4, TransportLayer::Other(1)),
            frame::IPV4_ONLY => (v4, TransportLayer::None),
            _ => {
                return Err(DomainError::UndecodablePacket(
                    "no network or transport layer".to_string(),
                ))
            }
        };

        Ok(DecodedPacket { network, transport })
    }
}

// ── dns parser ───────────────────────────────────────────────────────────────

/// Returns the configured message for any payload except ones starting
/// with `bad`.
pub struct MockDnsParser {
    message: DnsMessage<MockRecord>,
    seen: Arc<Mutex<Vec<(Vec<u8>, Transport)>>>,
}

impl MockDnsParser {
    pub fn new(message: DnsMessage<MockRecord>) -> Self {
        Self {
            message,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<(Vec<u8>, Transport)>>> {
        Arc::clone(&self.seen)
    }
}

impl DnsParser for MockDnsParser {
    type Record = MockRecord;

    fn parse(
        &self,
        payload: &[u8],
        transport: Transport,
    ) -> Result<DnsMessage<MockRecord>, DomainError> {
        self.seen.lock().unwrap().push((payload.to_vec(), transport));
        if payload.starts_with(b"bad") {
            return Err(DomainError::InvalidDnsMessage("truncated header".to_string()));
        }
        Ok(self.message.clone())
    }
}

// ── record encoder ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct EncoderState {
    pub records: Vec<CaptureRecord>,
    pub init_calls: usize,
    pub close_calls: usize,
}

#[derive(Clone, Default)]
pub struct MockRecordEncoder {
    state: Arc<Mutex<EncoderState>>,
    fail_after: Option<usize>,
}

impl MockRecordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(records: usize) -> Self {
        Self {
            fail_after: Some(records),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<CaptureRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn init_calls(&self) -> usize {
        self.state.lock().unwrap().init_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

impl RecordEncoder for MockRecordEncoder {
    fn init(&mut self) -> Result<(), DomainError> {
        self.state.lock().unwrap().init_calls += 1;
        Ok(())
    }

    fn encode(&mut self, record: &CaptureRecord) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if self.fail_after == Some(state.records.len()) {
            return Err(DomainError::IoError("broken pipe".to_string()));
        }
        state.records.push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), DomainError> {
        self.state.lock().unwrap().close_calls += 1;
        Ok(())
    }
}
