use crate::ports::{CaptureSource, DnsParser, PacketDecoder, RecordEncoder};
use crate::services::{fingerprint, PacketMetadata, RecordBuilder};
use ferrous_capture_domain::{
    CaptureStats, CapturedPacket, Config, DomainError, NetworkLayer, Transport, TransportLayer,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Drives packets from capture sources through decoding, DNS parsing, record
/// building and encoding.
///
/// Runs on a single thread; `start` must be called before the first source
/// and `finish` after the last one.
pub struct RunCapturePipelineUseCase<P: DnsParser> {
    decoder: Arc<dyn PacketDecoder>,
    parser: P,
    encoder: Box<dyn RecordEncoder>,
    builder: RecordBuilder,
    include_tcp: bool,
    stats: CaptureStats,
    started: bool,
}

impl<P: DnsParser> RunCapturePipelineUseCase<P> {
    pub fn new(
        decoder: Arc<dyn PacketDecoder>,
        parser: P,
        encoder: Box<dyn RecordEncoder>,
        config: &Config,
    ) -> Self {
        Self {
            decoder,
            parser,
            encoder,
            builder: RecordBuilder::new(&config.parsing, &config.output),
            include_tcp: config.parsing.include_tcp,
            stats: CaptureStats::new(),
            started: false,
        }
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        if !self.started {
            self.encoder.init()?;
            self.started = true;
        }
        Ok(())
    }

    /// Consumes `source` until end of input. A read error ends this input
    /// only; encoder failures abort the run.
    pub fn process_source(&mut self, source: &mut dyn CaptureSource) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::EncoderNotInitialized);
        }

        let name = source.name().to_string();
        debug!(source = %name, "Reading capture source");

        loop {
            match source.next_packet() {
                Ok(Some(packet)) => self.process_packet(&packet)?,
                Ok(None) => break,
                Err(e) => {
                    warn!(source = %name, error = %e, "Capture read failed, ending input");
                    break;
                }
            }
        }

        debug!(source = %name, packets = self.stats.total, "Capture source exhausted");
        Ok(())
    }

    pub fn process_packet(&mut self, packet: &CapturedPacket<'_>) -> Result<(), DomainError> {
        self.stats.total += 1;

        let decoded = match self.decoder.decode(packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.stats.errors += 1;
                debug!(error = %e, link_type = %packet.link_type, "Could not decode packet");
                return Ok(());
            }
        };

        match decoded.network {
            NetworkLayer::Ipv4 { .. } => self.stats.ipv4 += 1,
            NetworkLayer::Ipv6 { .. } => self.stats.ipv6 += 1,
            NetworkLayer::None => {}
        }

        let (transport, src_port, dst_port, payload) = match decoded.transport {
            TransportLayer::Udp {
                src_port,
                dst_port,
                payload,
            } => {
                self.stats.udp += 1;
                (Transport::Udp, src_port, dst_port, payload)
            }
            TransportLayer::Tcp {
                src_port,
                dst_port,
                payload,
            } => {
                self.stats.tcp += 1;
                (Transport::Tcp, src_port, dst_port, payload)
            }
            TransportLayer::Other(protocol) => {
                debug!(
                    error = %DomainError::UnsupportedTransport(protocol),
                    "Skipping packet"
                );
                return Ok(());
            }
            TransportLayer::None => {
                debug!("Skipping packet without transport layer");
                return Ok(());
            }
        };

        if transport == Transport::Tcp {
            if !self.include_tcp {
                trace!(src_port, dst_port, "Skipping TCP packet");
                return Ok(());
            }
            if payload.is_empty() {
                trace!(src_port, dst_port, "Skipping TCP segment without payload");
                return Ok(());
            }
        }

        let message = match self.parser.parse(payload, transport) {
            Ok(message) => message,
            Err(e) => {
                self.stats.errors += 1;
                warn!(
                    error = %e,
                    transport = %transport,
                    src_port,
                    dst_port,
                    "Could not parse DNS message"
                );
                return Ok(());
            }
        };
        self.stats.dns += 1;

        let addresses = decoded.network.addresses();
        let base = self.builder.base_record(PacketMetadata {
            timestamp: packet.timestamp.timestamp(),
            fingerprint: fingerprint(transport, packet.timestamp, packet.data, payload),
            transport,
            ipv4: decoded.network.is_ipv4(),
            src: addresses.map(|(src, _)| src),
            dst: addresses.map(|(_, dst)| dst),
            src_port,
            dst_port,
        });

        for record in self.builder.build(&base, &message) {
            self.encoder.encode(&record)?;
        }

        Ok(())
    }

    pub fn stats(&self) -> &CaptureStats {
        &self.stats
    }

    /// Closes the encoder and returns the accumulated counters.
    pub fn finish(mut self) -> Result<CaptureStats, DomainError> {
        if self.started {
            self.encoder.close()?;
        }

        log_summary(&self.stats, "Capture finished");
        Ok(self.stats)
    }

    /// Ends a run that failed part way. The encoder is still closed so that
    /// container outputs are finalized; a close failure is only logged.
    pub fn abort(mut self) -> CaptureStats {
        if self.started {
            if let Err(e) = self.encoder.close() {
                warn!(error = %e, "Failed to close encoder after aborted run");
            }
        }

        log_summary(&self.stats, "Capture aborted");
        self.stats
    }
}

fn log_summary(stats: &CaptureStats, message: &str) {
    info!(
        packet_total = stats.total,
        packet_ipv4 = stats.ipv4,
        packet_ipv6 = stats.ipv6,
        packet_tcp = stats.tcp,
        packet_udp = stats.udp,
        packet_dns = stats.dns,
        packet_errors = stats.errors,
        "{}",
        message
    );
}
