#![allow(dead_code)]
use ferrous_capture_domain::{DnsMessage, EcsInfo, Question, ResourceRecordView, OPT_RECORD_TYPE};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRecord {
    pub name: String,
    pub ttl: u32,
    pub rtype: u16,
    pub rdata: String,
}

impl MockRecord {
    pub fn a(name: &str, ttl: u32, ip: &str) -> Self {
        Self {
            name: name.to_string(),
            ttl,
            rtype: 1,
            rdata: ip.to_string(),
        }
    }

    pub fn ns(name: &str, ttl: u32, target: &str) -> Self {
        Self {
            name: name.to_string(),
            ttl,
            rtype: 2,
            rdata: target.to_string(),
        }
    }

    pub fn soa(name: &str, ttl: u32) -> Self {
        Self {
            name: name.to_string(),
            ttl,
            rtype: 6,
            rdata: "ns1.example.com. hostmaster.example.com. 1 7200 3600 1209600 300"
                .to_string(),
        }
    }

    pub fn opt() -> Self {
        Self {
            name: ".".to_string(),
            ttl: 0,
            rtype: OPT_RECORD_TYPE,
            rdata: String::new(),
        }
    }

    fn type_name(&self) -> String {
        match self.rtype {
            1 => "A".to_string(),
            2 => "NS".to_string(),
            6 => "SOA".to_string(),
            41 => "OPT".to_string(),
            other => format!("TYPE{}", other),
        }
    }
}

impl ResourceRecordView for MockRecord {
    fn owner_name(&self) -> String {
        self.name.clone()
    }

    fn ttl(&self) -> u32 {
        self.ttl
    }

    fn record_type(&self) -> u16 {
        self.rtype
    }

    fn header_text(&self) -> String {
        format!("{}\t{}\tIN\t{}", self.name, self.ttl, self.type_name())
    }

    fn to_text(&self) -> String {
        format!("{}\t{}", self.header_text(), self.rdata)
    }
}

pub struct DnsMessageBuilder {
    message: DnsMessage<MockRecord>,
}

impl DnsMessageBuilder {
    pub fn query(qname: &str, qtype: u16) -> Self {
        Self {
            message: DnsMessage {
                id: 4242,
                rcode: 0,
                truncated: false,
                response: false,
                recursion_desired: true,
                question: Some(Question {
                    name: qname.to_string(),
                    qtype,
                }),
                ecs: None,
                answers: vec![],
                authority: vec![],
                additional: vec![],
            },
        }
    }

    pub fn response(qname: &str, qtype: u16) -> Self {
        let mut builder = Self::query(qname, qtype);
        builder.message.response = true;
        builder
    }

    pub fn id(mut self, id: u16) -> Self {
        self.message.id = id;
        self
    }

    pub fn rcode(mut self, rcode: i32) -> Self {
        self.message.rcode = rcode;
        self
    }

    pub fn truncated(mut self) -> Self {
        self.message.truncated = true;
        self
    }

    pub fn no_question(mut self) -> Self {
        self.message.question = None;
        self
    }

    pub fn ecs(mut self, client: &str, source_prefix: u8, scope_prefix: u8) -> Self {
        self.message.ecs = Some(EcsInfo {
            client: client.parse::<IpAddr>().unwrap(),
            source_prefix,
            scope_prefix,
        });
        self
    }

    pub fn answer(mut self, record: MockRecord) -> Self {
        self.message.answers.push(record);
        self
    }

    pub fn authority(mut self, record: MockRecord) -> Self {
        self.message.authority.push(record);
        self
    }

    pub fn additional(mut self, record: MockRecord) -> Self {
        self.message.additional.push(record);
        self
    }

    pub fn build(self) -> DnsMessage<MockRecord> {
        self.message
    }
}
