use chrono::{DateTime, Utc};
use ferrous_capture_application::ports::CaptureSource;
use ferrous_capture_domain::config::CaptureConfig;
use ferrous_capture_domain::{CapturedPacket, DomainError, LinkType};
use pcap::{Active, Capture};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Consecutive libpcap read errors tolerated before the capture fails.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 8;

/// Captures from a network interface through libpcap.
///
/// Runs until `stop` is raised; the flag is checked after every packet and
/// every read timeout.
pub struct LiveCaptureSource {
    name: String,
    capture: Capture<Active>,
    link_type: LinkType,
    stop: Arc<AtomicBool>,
    scratch: Vec<u8>,
    read_errors: ReadErrors,
}

impl LiveCaptureSource {
    pub fn open(
        interface: &str,
        config: &CaptureConfig,
        stop: Arc<AtomicBool>,
    ) -> Result<Self, DomainError> {
        let open_error = |e: pcap::Error| DomainError::CaptureOpen {
            source_name: interface.to_string(),
            reason: e.to_string(),
        };

        let mut capture = Capture::from_device(interface)
            .map_err(open_error)?
            .snaplen(config.snaplen)
            .promisc(config.promiscuous)
            .timeout(config.timeout_ms)
            .open()
            .map_err(open_error)?;

        if let Some(expression) = &config.bpf_filter {
            capture
                .filter(expression, true)
                .map_err(|e| DomainError::InvalidFilter(format!("{}: {}", expression, e)))?;
        }

        let link_type = LinkType::from_dlt(capture.get_datalink().0);
        info!(
            interface,
            link_type = %link_type,
            snaplen = config.snaplen,
            promiscuous = config.promiscuous,
            "Live capture started"
        );

        Ok(Self {
            name: interface.to_string(),
            capture,
            link_type,
            stop,
            scratch: Vec::with_capacity(config.snaplen.max(0) as usize),
            read_errors: ReadErrors::default(),
        })
    }
}

impl CaptureSource for LiveCaptureSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_packet(&mut self) -> Result<Option<CapturedPacket<'_>>, DomainError> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(None);
            }

            let timestamp = match self.capture.next_packet() {
                Ok(packet) => {
                    self.read_errors.reset();
                    self.scratch.clear();
                    self.scratch.extend_from_slice(packet.data);
                    let ts = packet.header.ts;
                    DateTime::from_timestamp(ts.tv_sec as i64, (ts.tv_usec as u32) * 1_000)
                        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(e) => {
                    self.read_errors.record(&self.name, e)?;
                    continue;
                }
            };

            return Ok(Some(CapturedPacket {
                data: &self.scratch,
                link_type: self.link_type,
                timestamp,
            }));
        }
    }
}

/// Tracks consecutive read failures so a dead interface ends the capture
/// instead of spinning.
#[derive(Debug, Default)]
struct ReadErrors {
    consecutive: u32,
}

impl ReadErrors {
    fn reset(&mut self) {
        self.consecutive = 0;
    }

    fn record(&mut self, interface: &str, error: pcap::Error) -> Result<(), DomainError> {
        self.consecutive += 1;
        if self.consecutive >= MAX_CONSECUTIVE_READ_ERRORS {
            return Err(DomainError::CaptureRead(format!(
                "{}: {} ({} consecutive read errors)",
                interface, error, self.consecutive
            )));
        }
        warn!(
            interface,
            error = %error,
            consecutive = self.consecutive,
            "Capture read failed"
        );
        Ok(())
    }
}
