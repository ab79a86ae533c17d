//! # Device Firmware Protocol
//!
//! The HTTP surface of the modem firmware as seen by the bootstrap engine.
//! Every path, query string and log marker lives here so the wire contract
//! can be read and tested on its own.

pub mod firmware;
pub mod log_page;
