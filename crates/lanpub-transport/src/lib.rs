//! LANPUB Transport - Fire-and-forget peer messaging
//!
//! This crate provides:
//! - The `PeerTransport` seam the node sends through
//! - Timeout bounding (`BoundedTransport`)
//! - Bounded-concurrency fan-out for sweeps
//! - An in-memory mesh for multi-node tests
//!
//! Transport failures never surface as errors: a request that times out, is
//! refused, or reaches nobody simply yields no reply. The health-check loop
//! turns persistent silence into `reachable = false` on its next tick.

pub mod client;
pub mod mem;

pub use client::*;
pub use mem::*;
