use ferrous_capture_domain::config::{OutputConfig, ParsingConfig};
use ferrous_capture_domain::{
    CaptureRecord, DnsMessage, RecordData, RecordSection, ResourceRecordView, Transport,
};
use std::net::IpAddr;

/// Capture metadata shared by every record built from one packet.
#[derive(Debug, Clone)]
pub struct PacketMetadata {
    pub timestamp: i64,
    pub fingerprint: String,
    pub transport: Transport,
    pub ipv4: bool,
    pub src: Option<IpAddr>,
    pub dst: Option<IpAddr>,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Turns a parsed DNS message into output records.
///
/// Emits, in order: an optional question-only record, then one record per
/// answer, authority and additional RR. OPT pseudo-records are never emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    emit_questions: bool,
    emit_ecs_questions: bool,
    source: String,
    sensor: String,
}

impl RecordBuilder {
    pub fn new(parsing: &ParsingConfig, output: &OutputConfig) -> Self {
        Self {
            emit_questions: parsing.questions,
            emit_ecs_questions: parsing.questions_ecs,
            source: output.source.clone(),
            sensor: output.sensor.clone(),
        }
    }

    /// Record carrying the packet metadata and the provenance labels.
    pub fn base_record(&self, meta: PacketMetadata) -> CaptureRecord {
        CaptureRecord {
            timestamp: meta.timestamp,
            sha256: meta.fingerprint,
            udp: meta.transport == Transport::Udp,
            ipv4: meta.ipv4,
            src_address: meta.src.map(|ip| ip.to_string()).unwrap_or_default(),
            src_port: meta.src_port,
            dst_address: meta.dst.map(|ip| ip.to_string()).unwrap_or_default(),
            dst_port: meta.dst_port,
            source: self.source.clone(),
            sensor: self.sensor.clone(),
            ..Default::default()
        }
    }

    pub fn build<R: ResourceRecordView>(
        &self,
        base: &CaptureRecord,
        message: &DnsMessage<R>,
    ) -> Vec<CaptureRecord> {
        let header = with_message_header(base, message);
        let mut records = Vec::with_capacity(message.record_count() + 1);

        if self.wants_question_record(message) {
            records.push(header.question_only());
        }

        let sections = [
            (RecordSection::Answer, &message.answers),
            (RecordSection::Authority, &message.authority),
            (RecordSection::Additional, &message.additional),
        ];
        for (section, rrs) in sections {
            records.extend(
                rrs.iter()
                    .filter(|rr| !rr.is_opt())
                    .map(|rr| header.with_record(section, record_data(rr))),
            );
        }

        records
    }

    fn wants_question_record<R>(&self, message: &DnsMessage<R>) -> bool {
        if message.response {
            return message.is_nxdomain() && message.authority.is_empty();
        }
        self.emit_questions || (self.emit_ecs_questions && message.ecs.is_some())
    }
}

fn with_message_header<R>(base: &CaptureRecord, message: &DnsMessage<R>) -> CaptureRecord {
    let mut record = base.clone();
    record.id = message.id;
    record.rcode = message.rcode;
    record.truncated = message.truncated;
    record.response = message.response;
    record.recursion_desired = message.recursion_desired;
    if let Some(question) = &message.question {
        record.qname = question.name.clone();
        record.qtype = question.qtype;
    }
    record.set_ecs(message.ecs.as_ref());
    record
}

fn record_data<R: ResourceRecordView>(rr: &R) -> RecordData {
    RecordData {
        ttl: rr.ttl(),
        rname: rr.owner_name(),
        rtype: rr.record_type(),
        rdata: rdata_text(rr),
    }
}

/// Presentation form of the RR with its header prefix removed.
pub fn rdata_text<R: ResourceRecordView>(rr: &R) -> String {
    let text = rr.to_text();
    let header = rr.header_text();
    text.strip_prefix(header.as_str())
        .unwrap_or(&text)
        .trim_start()
        .to_string()
}
