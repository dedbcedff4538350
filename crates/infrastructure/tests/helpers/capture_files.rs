#![allow(dead_code)]

/// libpcap DLT numbers used by the tests.
pub const DLT_EN10MB: u32 = 1;
pub const DLT_RAW: u32 = 101;
pub const DLT_LINUX_SLL: u32 = 113;

pub struct LegacyPacket {
    pub ts_sec: u32,
    pub ts_frac: u32,
    pub data: Vec<u8>,
}

impl LegacyPacket {
    pub fn new(ts_sec: u32, ts_frac: u32, data: Vec<u8>) -> Self {
        Self {
            ts_sec,
            ts_frac,
            data,
        }
    }
}

/// Little-endian legacy pcap file. `nanosecond` selects the 0xa1b23c4d magic.
pub fn legacy_pcap(link_type: u32, nanosecond: bool, packets: &[LegacyPacket]) -> Vec<u8> {
    let magic: u32 = if nanosecond { 0xa1b2_3c4d } else { 0xa1b2_c3d4 };
    let mut file = Vec::new();
    file.extend_from_slice(&magic.to_le_bytes());
    file.extend_from_slice(&2u16.to_le_bytes());
    file.extend_from_slice(&4u16.to_le_bytes());
    file.extend_from_slice(&0i32.to_le_bytes());
    file.extend_from_slice(&0u32.to_le_bytes());
    file.extend_from_slice(&65535u32.to_le_bytes());
    file.extend_from_slice(&link_type.to_le_bytes());

    for packet in packets {
        file.extend_from_slice(&packet.ts_sec.to_le_bytes());
        file.extend_from_slice(&packet.ts_frac.to_le_bytes());
        file.extend_from_slice(&(packet.data.len() as u32).to_le_bytes());
        file.extend_from_slice(&(packet.data.len() as u32).to_le_bytes());
        file.extend_from_slice(&packet.data);
    }
    file
}

fn ng_block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total = (12 + body.len()) as u32;
    let mut block = Vec::with_capacity(total as usize);
    block.extend_from_slice(&block_type.to_le_bytes());
    block.extend_from_slice(&total.to_le_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total.to_le_bytes());
    block
}

fn pad4(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

pub struct NgInterface {
    pub link_type: u16,
    pub tsresol: Option<u8>,
}

pub struct NgPacket {
    pub interface: u32,
    pub ticks: u64,
    pub data: Vec<u8>,
}

/// Little-endian pcapng file with one section.
pub fn pcapng(interfaces: &[NgInterface], packets: &[NgPacket]) -> Vec<u8> {
    let mut file = Vec::new();

    let mut shb = Vec::new();
    shb.extend_from_slice(&0x1A2B_3C4Du32.to_le_bytes());
    shb.extend_from_slice(&1u16.to_le_bytes());
    shb.extend_from_slice(&0u16.to_le_bytes());
    shb.extend_from_slice(&(-1i64).to_le_bytes());
    file.extend_from_slice(&ng_block(0x0A0D_0D0A, &shb));

    for interface in interfaces {
        let mut idb = Vec::new();
        idb.extend_from_slice(&interface.link_type.to_le_bytes());
        idb.extend_from_slice(&0u16.to_le_bytes());
        idb.extend_from_slice(&65535u32.to_le_bytes());
        if let Some(tsresol) = interface.tsresol {
            idb.extend_from_slice(&9u16.to_le_bytes());
            idb.extend_from_slice(&1u16.to_le_bytes());
            idb.extend_from_slice(&[tsresol, 0, 0, 0]);
            idb.extend_from_slice(&[0, 0, 0, 0]);
        }
        file.extend_from_slice(&ng_block(1, &idb));
    }

    for packet in packets {
        let mut epb = Vec::new();
        epb.extend_from_slice(&packet.interface.to_le_bytes());
        epb.extend_from_slice(&((packet.ticks >> 32) as u32).to_le_bytes());
        epb.extend_from_slice(&(packet.ticks as u32).to_le_bytes());
        epb.extend_from_slice(&(packet.data.len() as u32).to_le_bytes());
        epb.extend_from_slice(&(packet.data.len() as u32).to_le_bytes());
        epb.extend_from_slice(&packet.data);
        pad4(&mut epb);
        file.extend_from_slice(&ng_block(6, &epb));
    }

    file
}
