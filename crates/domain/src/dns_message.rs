use std::net::IpAddr;

/// RR type of the EDNS0 pseudo-record (RFC 6891).
pub const OPT_RECORD_TYPE: u16 = 41;

/// NXDOMAIN response code (RFC 1035 §4.1.1).
pub const RCODE_NXDOMAIN: i32 = 3;

/// Read access to a parsed resource record.
///
/// `to_text` is the record's full presentation form; it starts with
/// `header_text` (owner name, TTL, class and type) followed by the RDATA.
pub trait ResourceRecordView {
    fn owner_name(&self) -> String;

    fn ttl(&self) -> u32;

    fn record_type(&self) -> u16;

    fn header_text(&self) -> String;

    fn to_text(&self) -> String;

    fn is_opt(&self) -> bool {
        self.record_type() == OPT_RECORD_TYPE
    }
}

/// EDNS Client Subnet option (RFC 7871).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcsInfo {
    pub client: IpAddr,
    pub source_prefix: u8,
    pub scope_prefix: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: u16,
}

/// Header fields and sections of one DNS message.
#[derive(Debug, Clone)]
pub struct DnsMessage<R> {
    pub id: u16,
    pub rcode: i32,
    pub truncated: bool,
    pub response: bool,
    pub recursion_desired: bool,
    pub question: Option<Question>,
    pub ecs: Option<EcsInfo>,
    pub answers: Vec<R>,
    pub authority: Vec<R>,
    pub additional: Vec<R>,
}

impl<R> DnsMessage<R> {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == RCODE_NXDOMAIN
    }

    pub fn record_count(&self) -> usize {
        self.answers.len() + self.authority.len() + self.additional.len()
    }
}
