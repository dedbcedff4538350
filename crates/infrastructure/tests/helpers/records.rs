#![allow(dead_code)]
use ferrous_capture_domain::{CaptureRecord, RecordData, RecordSection};

/// Response record carrying one answer, as produced by the record builder.
pub fn answer_record() -> CaptureRecord {
    base_record().with_record(
        RecordSection::Answer,
        RecordData {
            ttl: 300,
            rname: "example.com.".to_string(),
            rtype: 1,
            rdata: "93.184.216.34".to_string(),
        },
    )
}

/// Query record without resource-record fields.
pub fn question_record() -> CaptureRecord {
    CaptureRecord {
        response: false,
        src_address: "192.168.1.100".to_string(),
        src_port: 40000,
        dst_address: "192.168.1.1".to_string(),
        dst_port: 53,
        ..base_record()
    }
}

fn base_record() -> CaptureRecord {
    CaptureRecord {
        timestamp: 1_700_000_000,
        sha256: "ab".repeat(32),
        udp: true,
        ipv4: true,
        src_address: "192.168.1.1".to_string(),
        src_port: 53,
        dst_address: "192.168.1.100".to_string(),
        dst_port: 40000,
        id: 4242,
        rcode: 0,
        truncated: false,
        response: true,
        recursion_desired: true,
        qname: "example.com.".to_string(),
        qtype: 1,
        ..Default::default()
    }
}
