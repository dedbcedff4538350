use ferrous_capture_domain::{DomainError, LinkType};
use pcap::{BpfProgram, Capture, Linktype};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Filter compiled by libpcap, one program per link type.
///
/// Programs are compiled on first use of a link type; a link type libpcap
/// cannot compile the expression for rejects all of its packets.
pub struct LibpcapFilter {
    expression: String,
    programs: HashMap<LinkType, Option<BpfProgram>>,
}

impl LibpcapFilter {
    /// Compiles `expression` for Ethernet so syntax errors surface before
    /// any packet is read.
    pub fn compile(expression: &str) -> Result<Self, DomainError> {
        let program = compile_for(expression, LinkType::Ethernet)?;
        debug!(filter = expression, "Capture filter compiled by libpcap");

        let mut programs = HashMap::new();
        programs.insert(LinkType::Ethernet, Some(program));
        Ok(Self {
            expression: expression.to_string(),
            programs,
        })
    }

    pub fn matches(&mut self, data: &[u8], link_type: LinkType) -> bool {
        let expression = &self.expression;
        let program = self.programs.entry(link_type).or_insert_with(|| {
            compile_for(expression, link_type)
                .map_err(|e| warn!(link_type = %link_type, error = %e, "Filter rejects link type"))
                .ok()
        });
        program.as_ref().is_some_and(|program| program.filter(data))
    }
}

impl Clone for LibpcapFilter {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            programs: HashMap::new(),
        }
    }
}

impl fmt::Debug for LibpcapFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibpcapFilter")
            .field("expression", &self.expression)
            .field("link_types", &self.programs.len())
            .finish()
    }
}

fn compile_for(expression: &str, link_type: LinkType) -> Result<BpfProgram, DomainError> {
    let invalid = |e: pcap::Error| DomainError::InvalidFilter(format!("{}: {}", expression, e));
    Capture::dead(Linktype(link_type.dlt()))
        .map_err(invalid)?
        .compile(expression, true)
        .map_err(invalid)
}
