//! # Shared Types
//!
//! Building blocks used by every other crate in the workspace:
//!
//! * **[`config`]**: tuning knobs for the bootstrap engine.
//! * **[`error`]**: transport and precondition error types.
//! * **[`network`]**: candidate address parsing (hosts, ranges, CIDR blocks).

pub mod config;
pub mod error;
pub mod network;
