//! Ingress filter expressions for capture files.
//!
//! The built-in evaluator covers the part of the libpcap filter language
//! that matters for DNS traffic:
//!
//! ```text
//! expr      := and_expr ( ("or" | "||") and_expr )*
//! and_expr  := unary ( ["and" | "&&"] unary )*
//! unary     := ("not" | "!") unary | "(" expr ")" | primitive
//! primitive := "ip" | "ip6" | "tcp" | "udp" | "vlan" [ID]
//!            | ["src" | "dst"] "port" PORT
//!            | ["src" | "dst"] "portrange" PORT "-" PORT
//!            | ["src" | "dst"] "host" ADDR
//!            | ["src" | "dst"] "net" ADDR ["/" PREFIX]
//!            | "greater" LEN | "less" LEN
//! ```
//!
//! Adjacent terms without an operator are joined with "and", so
//! `udp port 53` reads as `udp and port 53`.
//!
//! With the `live` feature libpcap is linked and any expression outside this
//! dialect is compiled by libpcap instead, so file and interface captures
//! accept the same filters.

#[cfg(feature = "live")]
use super::bpf::LibpcapFilter;
use crate::wire::{decode_frame, DecodedFrame};
use ferrous_capture_domain::{DecodedPacket, DomainError, LinkType, NetworkLayer, TransportLayer};
use smallvec::SmallVec;
use std::fmt;
use std::iter::Peekable;
use std::net::IpAddr;
use std::vec::IntoIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Src,
    Dst,
    Either,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Primitive {
    Ip,
    Ip6,
    Tcp,
    Udp,
    Vlan(Option<u16>),
    Port(Direction, u16),
    PortRange(Direction, u16, u16),
    Host(Direction, IpAddr),
    Net(Direction, Network),
    Greater(usize),
    Less(usize),
}

/// Address prefix of a `net` primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Network {
    addr: IpAddr,
    prefix: u8,
}

impl Network {
    fn parse(word: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidFilter(format!("invalid net \"{}\"", word));
        let (addr, prefix) = match word.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (word, None),
        };
        let addr = addr.parse::<IpAddr>().map_err(|_| invalid())?;
        let width = address_width(&addr);
        let prefix = match prefix {
            Some(prefix) => prefix.parse::<u8>().map_err(|_| invalid())?,
            None => width,
        };
        if prefix > width {
            return Err(invalid());
        }
        let network = Self { addr, prefix };
        if address_bits(&addr) & !network.mask() != 0 {
            return Err(DomainError::InvalidFilter(format!(
                "non-network bits set in \"{}\"",
                word
            )));
        }
        Ok(network)
    }

    fn mask(&self) -> u128 {
        let width = address_width(&self.addr) as u32;
        let full = if width == 128 { u128::MAX } else { (1u128 << width) - 1 };
        let host_bits = width - self.prefix as u32;
        full.checked_shl(host_bits).map_or(0, |m| m & full)
    }

    fn contains(&self, addr: &IpAddr) -> bool {
        addr.is_ipv4() == self.addr.is_ipv4()
            && address_bits(addr) & self.mask() == address_bits(&self.addr)
    }
}

fn address_width(addr: &IpAddr) -> u8 {
    if addr.is_ipv4() {
        32
    } else {
        128
    }
}

fn address_bits(addr: &IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(*v4) as u128,
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

/// How a compiled filter is evaluated.
#[derive(Debug, Clone)]
enum Engine {
    Native(Expr),
    #[cfg(feature = "live")]
    Libpcap(LibpcapFilter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Primitive(Primitive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Word(String),
}

/// Compiled filter expression.
#[derive(Debug, Clone)]
pub struct PacketFilter {
    source: String,
    engine: Engine,
}

impl PacketFilter {
    pub fn compile(expression: &str) -> Result<Self, DomainError> {
        if expression.trim().is_empty() {
            return Err(DomainError::InvalidFilter("empty expression".to_string()));
        }

        let engine = match parse_expression(expression) {
            Ok(expr) => Engine::Native(expr),
            #[cfg(feature = "live")]
            Err(_) => Engine::Libpcap(LibpcapFilter::compile(expression)?),
            #[cfg(not(feature = "live"))]
            Err(e) => return Err(e),
        };

        Ok(Self {
            source: expression.to_string(),
            engine,
        })
    }

    pub fn expression(&self) -> &str {
        &self.source
    }

    /// Evaluates the expression against one captured frame. Frames the
    /// built-in evaluator cannot decode count as having no network or
    /// transport layer.
    pub fn matches_raw(&mut self, data: &[u8], link_type: LinkType) -> bool {
        match &mut self.engine {
            Engine::Native(expr) => {
                let frame = decode_frame(data, link_type).unwrap_or_else(|_| DecodedFrame {
                    packet: DecodedPacket {
                        network: NetworkLayer::None,
                        transport: TransportLayer::None,
                    },
                    vlan_ids: SmallVec::new(),
                    ip_protocol: None,
                });
                eval(
                    expr,
                    &Candidate {
                        frame: &frame,
                        len: data.len(),
                    },
                )
            }
            #[cfg(feature = "live")]
            Engine::Libpcap(filter) => filter.matches(data, link_type),
        }
    }
}

impl fmt::Display for PacketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression())
    }
}

fn parse_expression(expression: &str) -> Result<Expr, DomainError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.tokens.next() {
        return Err(DomainError::InvalidFilter(format!(
            "unexpected {:?} in \"{}\"",
            token, expression
        )));
    }
    Ok(expr)
}

/// A frame under evaluation together with its captured length.
struct Candidate<'f, 'a> {
    frame: &'f DecodedFrame<'a>,
    len: usize,
}

fn eval(expr: &Expr, candidate: &Candidate<'_, '_>) -> bool {
    match expr {
        Expr::Or(a, b) => eval(a, candidate) || eval(b, candidate),
        Expr::And(a, b) => eval(a, candidate) && eval(b, candidate),
        Expr::Not(inner) => !eval(inner, candidate),
        Expr::Primitive(primitive) => eval_primitive(primitive, candidate),
    }
}

fn eval_primitive(primitive: &Primitive, candidate: &Candidate<'_, '_>) -> bool {
    let frame = candidate.frame;
    let packet = &frame.packet;
    match primitive {
        Primitive::Ip => packet.network.is_ipv4(),
        Primitive::Ip6 => packet.network.is_ipv6(),
        Primitive::Tcp => matches!(packet.transport, TransportLayer::Tcp { .. }),
        Primitive::Udp => matches!(packet.transport, TransportLayer::Udp { .. }),
        Primitive::Vlan(None) => !frame.vlan_ids.is_empty(),
        Primitive::Vlan(Some(id)) => frame.vlan_ids.contains(id),
        Primitive::Port(direction, port) => packet
            .transport
            .ports()
            .is_some_and(|(src, dst)| direction_matches(*direction, src, dst, |p| p == *port)),
        Primitive::PortRange(direction, low, high) => {
            packet.transport.ports().is_some_and(|(src, dst)| {
                direction_matches(*direction, src, dst, |p| (*low..=*high).contains(&p))
            })
        }
        Primitive::Host(direction, addr) => packet
            .network
            .addresses()
            .is_some_and(|(src, dst)| direction_matches(*direction, src, dst, |a| a == *addr)),
        Primitive::Net(direction, network) => {
            packet.network.addresses().is_some_and(|(src, dst)| {
                direction_matches(*direction, src, dst, |a| network.contains(&a))
            })
        }
        Primitive::Greater(len) => candidate.len >= *len,
        Primitive::Less(len) => candidate.len <= *len,
    }
}

fn direction_matches<T>(direction: Direction, src: T, dst: T, accept: impl Fn(T) -> bool) -> bool {
    match direction {
        Direction::Src => accept(src),
        Direction::Dst => accept(dst),
        Direction::Either => accept(src) || accept(dst),
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, DomainError> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(DomainError::InvalidFilter(format!(
                        "expected \"{c}{c}\" in \"{expression}\""
                    )));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '!' | '&' | '|') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Word(word),
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn parse_or(&mut self) -> Result<Expr, DomainError> {
        let mut left = self.parse_and()?;
        while self.tokens.next_if_eq(&Token::Or).is_some() {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, DomainError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.tokens.peek() {
                Some(Token::And) => {
                    self.tokens.next();
                }
                Some(Token::Not | Token::LParen | Token::Word(_)) => {}
                _ => break,
            }
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, DomainError> {
        match self.tokens.next() {
            Some(Token::Not) => Ok(Expr::Not(Box::new(self.parse_unary()?))),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.tokens.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(DomainError::InvalidFilter("missing \")\"".to_string())),
                }
            }
            Some(Token::Word(word)) => self.parse_primitive(word).map(Expr::Primitive),
            Some(token) => Err(DomainError::InvalidFilter(format!(
                "unexpected {:?}",
                token
            ))),
            None => Err(DomainError::InvalidFilter(
                "unexpected end of expression".to_string(),
            )),
        }
    }

    fn parse_primitive(&mut self, word: String) -> Result<Primitive, DomainError> {
        match word.to_ascii_lowercase().as_str() {
            "ip" => Ok(Primitive::Ip),
            "ip6" => Ok(Primitive::Ip6),
            "tcp" => Ok(Primitive::Tcp),
            "udp" => Ok(Primitive::Udp),
            "vlan" => {
                let id = match self.tokens.peek() {
                    Some(Token::Word(next)) => next.parse::<u16>().ok(),
                    _ => None,
                };
                if id.is_some() {
                    self.tokens.next();
                }
                Ok(Primitive::Vlan(id))
            }
            "src" => self.parse_qualified(Direction::Src),
            "dst" => self.parse_qualified(Direction::Dst),
            "port" => self.parse_port(Direction::Either),
            "portrange" => self.parse_port_range(Direction::Either),
            "host" => self.parse_host(Direction::Either),
            "net" => self.parse_net(Direction::Either),
            "greater" => self.parse_length().map(Primitive::Greater),
            "less" => self.parse_length().map(Primitive::Less),
            _ => Err(DomainError::InvalidFilter(format!(
                "unknown primitive \"{}\"",
                word
            ))),
        }
    }

    fn parse_qualified(&mut self, direction: Direction) -> Result<Primitive, DomainError> {
        match self.next_word()?.to_ascii_lowercase().as_str() {
            "port" => self.parse_port(direction),
            "portrange" => self.parse_port_range(direction),
            "host" => self.parse_host(direction),
            "net" => self.parse_net(direction),
            other => Err(DomainError::InvalidFilter(format!(
                "unexpected \"{}\" after direction",
                other
            ))),
        }
    }

    fn parse_port(&mut self, direction: Direction) -> Result<Primitive, DomainError> {
        let word = self.next_word()?;
        Ok(Primitive::Port(direction, parse_port_number(&word)?))
    }

    fn parse_port_range(&mut self, direction: Direction) -> Result<Primitive, DomainError> {
        let word = self.next_word()?;
        let (low, high) = word.split_once('-').ok_or_else(|| {
            DomainError::InvalidFilter(format!("invalid port range \"{}\"", word))
        })?;
        let (low, high) = (parse_port_number(low)?, parse_port_number(high)?);
        Ok(Primitive::PortRange(direction, low.min(high), low.max(high)))
    }

    fn parse_net(&mut self, direction: Direction) -> Result<Primitive, DomainError> {
        let word = self.next_word()?;
        Ok(Primitive::Net(direction, Network::parse(&word)?))
    }

    fn parse_length(&mut self) -> Result<usize, DomainError> {
        let word = self.next_word()?;
        word.parse::<usize>()
            .map_err(|_| DomainError::InvalidFilter(format!("invalid length \"{}\"", word)))
    }

    fn parse_host(&mut self, direction: Direction) -> Result<Primitive, DomainError> {
        let word = self.next_word()?;
        let addr = word
            .parse::<IpAddr>()
            .map_err(|_| DomainError::InvalidFilter(format!("invalid host \"{}\"", word)))?;
        Ok(Primitive::Host(direction, addr))
    }

    fn next_word(&mut self) -> Result<String, DomainError> {
        match self.tokens.next() {
            Some(Token::Word(word)) => Ok(word),
            other => Err(DomainError::InvalidFilter(format!(
                "expected a value, found {:?}",
                other
            ))),
        }
    }
}

fn parse_port_number(word: &str) -> Result<u16, DomainError> {
    word.parse::<u16>()
        .map_err(|_| DomainError::InvalidFilter(format!("invalid port \"{}\"", word)))
}
