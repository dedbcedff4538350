mod message_parser;
mod presentation;

pub use message_parser::{HickoryDnsParser, HickoryRecord};
