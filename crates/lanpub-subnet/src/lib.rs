//! LANPUB Subnet - IPv4 address arithmetic
//!
//! This crate provides:
//! - Dotted-quad / integer conversion
//! - Subnet derivation (network, usable host range, broadcast)
//! - Host-range iteration for the subnet join sweep

pub mod addr;
pub mod info;

pub use addr::*;
pub use info::*;
