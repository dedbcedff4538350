mod decoder;
mod link;

pub use decoder::{decode_frame, DecodedFrame, WireDecoder};
