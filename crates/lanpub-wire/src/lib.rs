//! LANPUB Wire - Protocol messages and response envelopes
//!
//! This crate defines:
//! - The tagged union over the six protocol messages
//! - Per-kind required-field validation for inbound bodies
//! - `Reply`/`Body` response envelopes with `SUCCESS`/`FAILURE` status

pub mod message;
pub mod reply;

pub use message::*;
pub use reply::*;
