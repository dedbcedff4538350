use ferrous_capture_domain::LinkType;
use smallvec::SmallVec;

pub(crate) const ETHERTYPE_IPV4: u16 = 0x0800;
pub(crate) const ETHERTYPE_IPV6: u16 = 0x86DD;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88A8;
const ETHERTYPE_QINQ_LEGACY: u16 = 0x9100;

const ETHERNET_HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;
const NULL_HEADER_LEN: usize = 4;
const SLL_HEADER_LEN: usize = 16;
const SLL2_HEADER_LEN: usize = 20;

/// BSD address families carried in the DLT_NULL / DLT_LOOP header.
const AF_INET: u32 = 2;
const AF_INET6_VALUES: [u32; 3] = [24, 28, 30];

/// Network layer located behind the link-layer header.
pub(crate) struct LinkPayload {
    pub ethertype: u16,
    pub offset: usize,
    pub vlan_ids: SmallVec<[u16; 2]>,
}

/// Strips the link-layer header. `None` when the frame is too short or the
/// link type is not supported.
pub(crate) fn strip_link_layer(data: &[u8], link_type: LinkType) -> Option<LinkPayload> {
    let (ethertype, offset) = match link_type {
        LinkType::Ethernet => {
            if data.len() < ETHERNET_HEADER_LEN {
                return None;
            }
            (u16::from_be_bytes([data[12], data[13]]), ETHERNET_HEADER_LEN)
        }
        LinkType::LinuxSll => {
            if data.len() < SLL_HEADER_LEN {
                return None;
            }
            (u16::from_be_bytes([data[14], data[15]]), SLL_HEADER_LEN)
        }
        LinkType::LinuxSll2 => {
            if data.len() < SLL2_HEADER_LEN {
                return None;
            }
            (u16::from_be_bytes([data[0], data[1]]), SLL2_HEADER_LEN)
        }
        LinkType::Null => {
            if data.len() < NULL_HEADER_LEN {
                return None;
            }
            // Host byte order of the capturing machine; DLT_LOOP is big-endian.
            let raw = [data[0], data[1], data[2], data[3]];
            let family = [u32::from_le_bytes(raw), u32::from_be_bytes(raw)];
            if family.contains(&AF_INET) {
                (ETHERTYPE_IPV4, NULL_HEADER_LEN)
            } else if family.iter().any(|f| AF_INET6_VALUES.contains(f)) {
                (ETHERTYPE_IPV6, NULL_HEADER_LEN)
            } else {
                return None;
            }
        }
        LinkType::Raw => match data.first().map(|b| b >> 4) {
            Some(4) => (ETHERTYPE_IPV4, 0),
            Some(6) => (ETHERTYPE_IPV6, 0),
            _ => return None,
        },
        LinkType::Unknown(_) => return None,
    };

    skip_vlan_tags(data, ethertype, offset)
}

fn skip_vlan_tags(data: &[u8], mut ethertype: u16, mut offset: usize) -> Option<LinkPayload> {
    let mut vlan_ids = SmallVec::new();
    while matches!(
        ethertype,
        ETHERTYPE_VLAN | ETHERTYPE_QINQ | ETHERTYPE_QINQ_LEGACY
    ) {
        if data.len() < offset + VLAN_TAG_LEN {
            return None;
        }
        vlan_ids.push(u16::from_be_bytes([data[offset], data[offset + 1]]) & 0x0FFF);
        ethertype = u16::from_be_bytes([data[offset + 2], data[offset + 3]]);
        offset += VLAN_TAG_LEN;
    }

    Some(LinkPayload {
        ethertype,
        offset,
        vlan_ids,
    })
}
