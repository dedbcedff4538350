use super::filter::PacketFilter;
use chrono::{DateTime, Utc};
use ferrous_capture_application::ports::CaptureSource;
use ferrous_capture_domain::{CapturedPacket, DomainError, LinkType};
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{create_reader, Block, PcapBlockOwned, PcapError};
use std::fs::File;
use std::io::Read;
use tracing::debug;

const READER_CAPACITY: usize = 1 << 20;

/// Name that selects standard input instead of a file.
pub const STDIN_SOURCE: &str = "-";

const NANOSECOND_MAGIC: [u32; 2] = [0xa1b2_3c4d, 0x4d3c_b2a1];

#[derive(Debug, Clone, Copy)]
struct InterfaceInfo {
    link_type: LinkType,
    tsresol: u8,
    tsoffset: i64,
}

/// Per-section parser state, updated as header blocks are read.
#[derive(Debug, Default)]
struct SectionState {
    legacy_link_type: Option<LinkType>,
    legacy_nanos: bool,
    interfaces: Vec<InterfaceInfo>,
}

/// Reads pcap and pcapng captures from a file or standard input.
pub struct PcapFileSource {
    name: String,
    reader: Box<dyn PcapReaderIterator>,
    state: SectionState,
    filter: Option<PacketFilter>,
    scratch: Vec<u8>,
    filtered: u64,
}

impl PcapFileSource {
    /// Opens `path`; `-` reads standard input.
    pub fn open(path: &str, filter: Option<PacketFilter>) -> Result<Self, DomainError> {
        let input: Box<dyn Read> = if path == STDIN_SOURCE {
            Box::new(std::io::stdin())
        } else {
            Box::new(File::open(path).map_err(|e| DomainError::CaptureOpen {
                source_name: path.to_string(),
                reason: e.to_string(),
            })?)
        };
        Self::from_reader(path, input, filter)
    }

    pub fn from_reader<R: Read + 'static>(
        name: &str,
        input: R,
        filter: Option<PacketFilter>,
    ) -> Result<Self, DomainError> {
        let reader = create_reader(READER_CAPACITY, input).map_err(|e| DomainError::CaptureOpen {
            source_name: name.to_string(),
            reason: format!("not a pcap or pcapng capture: {:?}", e),
        })?;

        if let Some(filter) = &filter {
            debug!(source = name, filter = %filter, "Capture filter compiled");
        }

        Ok(Self {
            name: name.to_string(),
            reader,
            state: SectionState::default(),
            filter,
            scratch: Vec::with_capacity(READER_CAPACITY),
            filtered: 0,
        })
    }

    /// Packets rejected by the filter so far.
    pub fn filtered(&self) -> u64 {
        self.filtered
    }
}

impl CaptureSource for PcapFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_packet(&mut self) -> Result<Option<CapturedPacket<'_>>, DomainError> {
        loop {
            let header = match self.reader.next() {
                Ok((offset, block)) => {
                    let header = read_block(block, &mut self.state, &mut self.scratch);
                    self.reader.consume(offset);
                    header
                }
                Err(PcapError::Eof) => {
                    debug!(source = %self.name, filtered = self.filtered, "End of capture");
                    return Ok(None);
                }
                Err(PcapError::Incomplete { .. }) => {
                    self.reader.refill().map_err(|e| {
                        DomainError::CaptureRead(format!("{}: {:?}", self.name, e))
                    })?;
                    continue;
                }
                Err(e) => {
                    return Err(DomainError::CaptureRead(format!("{}: {:?}", self.name, e)));
                }
            };

            let Some((link_type, timestamp)) = header else {
                continue;
            };

            if let Some(filter) = self.filter.as_mut() {
                if !filter.matches_raw(&self.scratch, link_type) {
                    self.filtered += 1;
                    continue;
                }
            }

            return Ok(Some(CapturedPacket {
                data: &self.scratch,
                link_type,
                timestamp,
            }));
        }
    }
}

/// Copies packet data of `block` into `scratch` and returns its link type
/// and timestamp. Header blocks update `state` and yield `None`.
fn read_block(
    block: PcapBlockOwned<'_>,
    state: &mut SectionState,
    scratch: &mut Vec<u8>,
) -> Option<(LinkType, DateTime<Utc>)> {
    match block {
        PcapBlockOwned::LegacyHeader(header) => {
            state.legacy_link_type = Some(LinkType::from_dlt(header.network.0));
            state.legacy_nanos = NANOSECOND_MAGIC.contains(&header.magic_number);
            None
        }
        PcapBlockOwned::Legacy(packet) => {
            let len = (packet.caplen as usize).min(packet.data.len());
            copy_into(scratch, &packet.data[..len]);
            let nanos = if state.legacy_nanos {
                packet.ts_usec
            } else {
                packet.ts_usec.saturating_mul(1_000)
            };
            let timestamp = DateTime::from_timestamp(packet.ts_sec as i64, nanos)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            Some((state.legacy_link_type?, timestamp))
        }
        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
            state.interfaces.clear();
            None
        }
        PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
            state.interfaces.push(InterfaceInfo {
                link_type: LinkType::from_dlt(idb.linktype.0),
                tsresol: idb.if_tsresol,
                tsoffset: idb.if_tsoffset as i64,
            });
            None
        }
        PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
            let interface = *state.interfaces.get(epb.if_id as usize)?;
            let len = (epb.caplen as usize).min(epb.data.len());
            copy_into(scratch, &epb.data[..len]);
            let ticks = ((epb.ts_high as u64) << 32) | epb.ts_low as u64;
            Some((interface.link_type, ng_timestamp(ticks, interface)))
        }
        PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
            let interface = *state.interfaces.first()?;
            let len = (spb.origlen as usize).min(spb.data.len());
            copy_into(scratch, &spb.data[..len]);
            Some((interface.link_type, DateTime::<Utc>::UNIX_EPOCH))
        }
        PcapBlockOwned::NG(_) => None,
    }
}

fn copy_into(scratch: &mut Vec<u8>, data: &[u8]) {
    scratch.clear();
    scratch.extend_from_slice(data);
}

/// Converts pcapng timestamp ticks using the interface's `if_tsresol`
/// (power of ten, or power of two when the high bit is set) and `if_tsoffset`.
fn ng_timestamp(ticks: u64, interface: InterfaceInfo) -> DateTime<Utc> {
    let resol = interface.tsresol;
    let units_per_sec: u64 = if resol & 0x80 != 0 {
        1u64.checked_shl((resol & 0x7f) as u32).unwrap_or(u64::MAX)
    } else {
        10u64.checked_pow(resol as u32).unwrap_or(u64::MAX)
    };

    let Some(secs) = i64::try_from(ticks / units_per_sec)
        .ok()
        .and_then(|secs| secs.checked_add(interface.tsoffset))
    else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };
    let frac = ticks % units_per_sec;
    let nanos = (frac as u128 * 1_000_000_000 / units_per_sec as u128) as u32;

    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
