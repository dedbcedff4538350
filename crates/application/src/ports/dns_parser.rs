use ferrous_capture_domain::{DnsMessage, DomainError, ResourceRecordView, Transport};

/// Unpacks a DNS message from a transport payload.
pub trait DnsParser: Send + Sync {
    type Record: ResourceRecordView;

    /// TCP payloads start with the two-byte length prefix.
    fn parse(
        &self,
        payload: &[u8],
        transport: Transport,
    ) -> Result<DnsMessage<Self::Record>, DomainError>;
}
