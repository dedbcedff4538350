use chrono::{DateTime, Utc};
use ferrous_capture_domain::Transport;
use sha2::{Digest, Sha256};

/// Content fingerprint of a DNS packet as lowercase hex SHA-256.
///
/// TCP hashes the transport payload only. UDP hashes the capture timestamp
/// (seconds as big-endian `i64`, then nanoseconds as big-endian `u32`)
/// followed by the whole raw packet, so retransmitted datagrams hash apart.
pub fn fingerprint(
    transport: Transport,
    timestamp: DateTime<Utc>,
    raw_packet: &[u8],
    payload: &[u8],
) -> String {
    let mut hasher = Sha256::new();
    match transport {
        Transport::Tcp => hasher.update(payload),
        Transport::Udp => {
            hasher.update(timestamp.timestamp().to_be_bytes());
            hasher.update(timestamp.timestamp_subsec_nanos().to_be_bytes());
            hasher.update(raw_packet);
        }
    }
    format!("{:x}", hasher.finalize())
}
