//! RFC 1035 §5.1 presentation form of RDATA.
//!
//! Domain names inside RDATA are written in their ASCII (punycode) form and
//! every character-string is quoted, so the text maps back to the wire bytes.

use std::fmt::Write;

use hickory_proto::rr::rdata::{NULL, SVCB};
use hickory_proto::rr::{Name, RData};

/// Renders `rdata` the way a zone file would carry it.
pub fn rdata_text(rdata: &RData) -> String {
    match rdata {
        RData::A(address) => address.to_string(),
        RData::AAAA(address) => address.to_string(),
        RData::ANAME(name) => name_text(&name.0),
        RData::CNAME(name) => name_text(&name.0),
        RData::NS(name) => name_text(&name.0),
        RData::PTR(name) => name_text(&name.0),
        RData::MX(mx) => format!("{} {}", mx.preference(), name_text(mx.exchange())),
        RData::SOA(soa) => format!(
            "{} {} {} {} {} {} {}",
            name_text(soa.mname()),
            name_text(soa.rname()),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        ),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            name_text(srv.target())
        ),
        RData::TXT(txt) => {
            let strings: Vec<String> = txt.iter().map(|s| character_string(s)).collect();
            strings.join(" ")
        }
        RData::HINFO(hinfo) => format!(
            "{} {}",
            character_string(hinfo.cpu()),
            character_string(hinfo.os())
        ),
        RData::NAPTR(naptr) => format!(
            "{} {} {} {} {} {}",
            naptr.order(),
            naptr.preference(),
            character_string(naptr.flags()),
            character_string(naptr.services()),
            character_string(naptr.regexp()),
            name_text(naptr.replacement())
        ),
        RData::SVCB(svcb) => svcb_text(svcb),
        RData::HTTPS(https) => svcb_text(&https.0),
        RData::NULL(null) => unknown_text(null),
        RData::Unknown { rdata, .. } => unknown_text(rdata),
        RData::OPT(_) | RData::ZERO => String::new(),
        other => other.to_string(),
    }
}

fn name_text(name: &Name) -> String {
    name.to_ascii()
}

/// Quoted `<character-string>`; `"` and `\` are backslash-escaped and
/// non-printable bytes become `\DDD`.
fn character_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &byte in bytes {
        match byte {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            b' '..=b'~' => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03}", byte);
            }
        }
    }
    out.push('"');
    out
}

fn svcb_text(svcb: &SVCB) -> String {
    let mut out = format!("{} {}", svcb.svc_priority(), name_text(svcb.target_name()));
    for (key, value) in svcb.svc_params() {
        let _ = write!(out, " {}={}", key, value);
    }
    out
}

/// RFC 3597 generic encoding: `\# <length> <hex>`.
fn unknown_text(rdata: &NULL) -> String {
    let bytes = rdata.anything();
    let mut out = format!("\\# {}", bytes.len());
    if !bytes.is_empty() {
        out.push(' ');
        for byte in bytes {
            let _ = write!(out, "{:02x}", byte);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::{CNAME, TXT};
    use std::str::FromStr;

    #[test]
    fn test_character_string_escapes_quote_and_backslash() {
        assert_eq!(character_string(br#"say "hi"\"#), r#""say \"hi\"\\""#);
    }

    #[test]
    fn test_character_string_escapes_control_bytes() {
        assert_eq!(character_string(&[b'a', 0x09, 0xff]), r#""a\009\255""#);
    }

    #[test]
    fn test_txt_keeps_string_boundaries() {
        let txt = RData::TXT(TXT::new(vec!["a b".to_string(), "c".to_string()]));
        assert_eq!(rdata_text(&txt), r#""a b" "c""#);
    }

    #[test]
    fn test_cname_target_stays_in_ace_form() {
        let target = Name::from_str("xn--caf-dma.example.").unwrap();
        assert_eq!(
            rdata_text(&RData::CNAME(CNAME(target))),
            "xn--caf-dma.example."
        );
    }

    #[test]
    fn test_unknown_uses_generic_encoding() {
        assert_eq!(unknown_text(&NULL::with(vec![0xde, 0xad])), "\\# 2 dead");
        assert_eq!(unknown_text(&NULL::with(Vec::new())), "\\# 0");
    }
}
