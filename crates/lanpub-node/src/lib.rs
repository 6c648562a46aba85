//! LANPUB Node - Broker-less pub/sub over a local subnet
//!
//! Each node announces itself by sweeping the subnet with join messages,
//! tracks peer liveness with periodic health checks, and propagates channel
//! subscriptions and published messages directly to peers. No central
//! server, no delivery guarantees: requests are fire-and-forget and
//! persistent silence surfaces as `reachable = false`.
//!
//! The embedded HTTP server and client are the host's: inbound requests are
//! fed to [`Router::route`], outbound ones go through the
//! [`lanpub_transport::PeerTransport`] the host supplies.

pub mod channels;
pub mod host;
pub mod membership;
pub mod node;
pub mod router;

pub use channels::{Callback, ChannelRegistry};
pub use host::{Connectivity, HostNetwork, StaticHost};
pub use membership::{MembershipTable, Peer};
pub use node::{Node, PeerJoinedListener};
pub use router::Router;
