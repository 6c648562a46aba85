//! LANPUB Core - Fundamental types shared across the workspace
//!
//! This crate defines:
//! - The error taxonomy (`LanpubError`) and result alias
//! - Node configuration and protocol constants

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;
