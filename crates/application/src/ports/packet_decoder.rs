use ferrous_capture_domain::{CapturedPacket, DecodedPacket, DomainError};

/// Demultiplexes link, network and transport layers of a captured packet.
pub trait PacketDecoder: Send + Sync {
    /// Fails only when neither a network nor a transport layer could be decoded.
    fn decode<'a>(&self, packet: &CapturedPacket<'a>) -> Result<DecodedPacket<'a>, DomainError>;
}
