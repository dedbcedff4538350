//! Ferrous Capture Infrastructure Layer
pub mod capture;
pub mod dns;
pub mod output;
pub mod stream;
pub mod wire;
