#[cfg(feature = "live")]
mod bpf;
mod file;
mod filter;
#[cfg(feature = "live")]
mod live;

pub use file::{PcapFileSource, STDIN_SOURCE};
pub use filter::PacketFilter;
#[cfg(feature = "live")]
pub use live::LiveCaptureSource;
