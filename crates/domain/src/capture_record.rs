use crate::dns_message::EcsInfo;
use serde::{Deserialize, Serialize};

/// Which message section a resource record was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSection {
    Answer,
    Authority,
    Additional,
}

/// Resource-record specific part of a [`CaptureRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    pub ttl: u32,
    pub rname: String,
    pub rtype: u16,
    pub rdata: String,
}

/// One output row: capture metadata, DNS header fields and at most one
/// resource record.
///
/// Field names are the wire names of the line-delimited JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub timestamp: i64,
    pub sha256: String,
    pub udp: bool,
    pub ipv4: bool,
    pub src_address: String,
    pub src_port: u16,
    pub dst_address: String,
    pub dst_port: u16,
    pub id: u16,
    pub rcode: i32,
    pub truncated: bool,
    pub response: bool,
    pub recursion_desired: bool,
    pub answer: bool,
    pub authority: bool,
    pub additional: bool,
    pub qname: String,
    pub qtype: u16,
    pub ttl: Option<u32>,
    pub rname: Option<String>,
    pub rtype: Option<u16>,
    pub rdata: Option<String>,
    pub ecs_client: Option<String>,
    pub ecs_source: Option<u8>,
    pub ecs_scope: Option<u8>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sensor: String,
}

impl CaptureRecord {
    /// Copy of this record carrying one resource record from `section`.
    pub fn with_record(&self, section: RecordSection, data: RecordData) -> Self {
        let mut record = self.clone();
        record.answer = section == RecordSection::Answer;
        record.authority = section == RecordSection::Authority;
        record.additional = section == RecordSection::Additional;
        record.ttl = Some(data.ttl);
        record.rname = Some(data.rname);
        record.rtype = Some(data.rtype);
        record.rdata = Some(data.rdata);
        record
    }

    /// Copy of this record with every resource-record field cleared.
    pub fn question_only(&self) -> Self {
        let mut record = self.clone();
        record.answer = false;
        record.authority = false;
        record.additional = false;
        record.ttl = None;
        record.rname = None;
        record.rtype = None;
        record.rdata = None;
        record
    }

    pub fn set_ecs(&mut self, ecs: Option<&EcsInfo>) {
        match ecs {
            Some(ecs) => {
                self.ecs_client = Some(ecs.client.to_string());
                self.ecs_source = Some(ecs.source_prefix);
                self.ecs_scope = Some(ecs.scope_prefix);
            }
            None => {
                self.ecs_client = None;
                self.ecs_source = None;
                self.ecs_scope = None;
            }
        }
    }

    pub fn section(&self) -> Option<RecordSection> {
        match (self.answer, self.authority, self.additional) {
            (true, false, false) => Some(RecordSection::Answer),
            (false, true, false) => Some(RecordSection::Authority),
            (false, false, true) => Some(RecordSection::Additional),
            _ => None,
        }
    }

    pub fn is_question_only(&self) -> bool {
        self.section().is_none()
            && self.ttl.is_none()
            && self.rname.is_none()
            && self.rtype.is_none()
            && self.rdata.is_none()
    }
}
