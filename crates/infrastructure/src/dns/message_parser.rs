use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ferrous_capture_application::ports::DnsParser;
use ferrous_capture_domain::{
    DnsMessage, DomainError, EcsInfo, Question, ResourceRecordView, Transport,
};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use hickory_proto::rr::Record;
use tracing::trace;

use super::presentation;

const TCP_LENGTH_PREFIX: usize = 2;

/// Resource record decoded by hickory.
#[derive(Debug, Clone)]
pub struct HickoryRecord(Record);

impl From<Record> for HickoryRecord {
    fn from(record: Record) -> Self {
        Self(record)
    }
}

impl ResourceRecordView for HickoryRecord {
    fn owner_name(&self) -> String {
        self.0.name().to_ascii()
    }

    fn ttl(&self) -> u32 {
        self.0.ttl()
    }

    fn record_type(&self) -> u16 {
        u16::from(self.0.record_type())
    }

    fn header_text(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.0.name().to_ascii(),
            self.0.ttl(),
            self.0.dns_class(),
            self.0.record_type()
        )
    }

    fn to_text(&self) -> String {
        let rdata = self.0.data().map(presentation::rdata_text).unwrap_or_default();
        format!("{}\t{}", self.header_text(), rdata)
    }
}

/// DNS message parser backed by `hickory-proto`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HickoryDnsParser;

impl HickoryDnsParser {
    pub fn new() -> Self {
        Self
    }
}

impl DnsParser for HickoryDnsParser {
    type Record = HickoryRecord;

    fn parse(
        &self,
        payload: &[u8],
        transport: Transport,
    ) -> Result<DnsMessage<HickoryRecord>, DomainError> {
        let wire = match transport {
            Transport::Udp => payload,
            Transport::Tcp => strip_length_prefix(payload)?,
        };

        let message = Message::from_vec(wire).map_err(|e| {
            DomainError::InvalidDnsMessage(format!("Failed to parse DNS message: {}", e))
        })?;

        let question = message.queries().last().map(|query| Question {
            name: query.name().to_ascii(),
            qtype: u16::from(query.query_type()),
        });
        let ecs = client_subnet(&message);

        trace!(
            id = message.id(),
            answers = message.answer_count(),
            authority = message.name_server_count(),
            additional = message.additional_count(),
            ecs = ecs.is_some(),
            "DNS message parsed"
        );

        let mut message = message;
        Ok(DnsMessage {
            id: message.id(),
            rcode: u16::from(message.response_code()) as i32,
            truncated: message.truncated(),
            response: message.message_type() == MessageType::Response,
            recursion_desired: message.recursion_desired(),
            question,
            ecs,
            answers: into_records(message.take_answers()),
            authority: into_records(message.take_name_servers()),
            additional: into_records(message.take_additionals()),
        })
    }
}

fn into_records(records: Vec<Record>) -> Vec<HickoryRecord> {
    records.into_iter().map(HickoryRecord::from).collect()
}

/// Returns the framed message behind the RFC 1035 two-byte length prefix.
fn strip_length_prefix(payload: &[u8]) -> Result<&[u8], DomainError> {
    if payload.len() < TCP_LENGTH_PREFIX {
        return Err(DomainError::InvalidDnsMessage(format!(
            "TCP payload of {} bytes has no length prefix",
            payload.len()
        )));
    }
    let declared = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let body = &payload[TCP_LENGTH_PREFIX..];
    Ok(&body[..declared.min(body.len())])
}

fn client_subnet(message: &Message) -> Option<EcsInfo> {
    let edns = message.extensions().as_ref()?;
    match edns.options().get(EdnsCode::Subnet)? {
        EdnsOption::Subnet(subnet) => {
            let option = Vec::<u8>::try_from(subnet).ok()?;
            decode_client_subnet(&option)
        }
        _ => None,
    }
}

/// Decodes the RFC 7871 option body: FAMILY (u16), SOURCE PREFIX-LENGTH,
/// SCOPE PREFIX-LENGTH, then the address truncated to the source prefix.
fn decode_client_subnet(option: &[u8]) -> Option<EcsInfo> {
    if option.len() < 4 {
        return None;
    }
    let family = u16::from_be_bytes([option[0], option[1]]);
    let source_prefix = option[2];
    let scope_prefix = option[3];
    let address = &option[4..];

    let client = match family {
        1 => {
            let mut octets = [0u8; 4];
            let len = address.len().min(octets.len());
            octets[..len].copy_from_slice(&address[..len]);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        2 => {
            let mut octets = [0u8; 16];
            let len = address.len().min(octets.len());
            octets[..len].copy_from_slice(&address[..len]);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return None,
    };

    Some(EcsInfo {
        client,
        source_prefix,
        scope_prefix,
    })
}
