//! Membership table
//!
//! Maps every known peer to its last-observed reachability. Per-peer state
//! machine: Unknown -> Reachable (join or healthcheck contact) ->
//! Unreachable (failed probe) -> Reachable (next success) -> Removed
//! (explicit leave only). Health checks flip the flag but never evict.

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Last-known state of a peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peer {
    /// Whether the peer answered its most recent contact
    pub reachable: bool,
}

/// Known peers, keyed by address. At most one entry per address.
#[derive(Debug, Default)]
pub struct MembershipTable {
    peers: HashMap<Ipv4Addr, Peer>,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer as reachable. Returns true if it was unknown before.
    pub fn insert(&mut self, addr: Ipv4Addr) -> bool {
        self.peers.insert(addr, Peer { reachable: true }).is_none()
    }

    /// Remove a peer (explicit leave). Returns true if it was known.
    pub fn remove(&mut self, addr: Ipv4Addr) -> bool {
        self.peers.remove(&addr).is_some()
    }

    /// Record a probe outcome for a known peer. Unknown addresses are
    /// ignored: a peer that left mid-sweep must not be resurrected.
    pub fn mark(&mut self, addr: Ipv4Addr, reachable: bool) {
        if let Some(peer) = self.peers.get_mut(&addr) {
            peer.reachable = reachable;
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.peers.contains_key(&addr)
    }

    pub fn get(&self, addr: Ipv4Addr) -> Option<Peer> {
        self.peers.get(&addr).copied()
    }

    /// All known peer addresses, reachable or not.
    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        self.peers.keys().copied().collect()
    }

    /// Copy of the full table, for callers outside the lock.
    pub fn snapshot(&self) -> HashMap<Ipv4Addr, bool> {
        self.peers.iter().map(|(a, p)| (*a, p.reachable)).collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
