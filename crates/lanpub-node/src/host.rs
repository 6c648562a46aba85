//! Host network capability
//!
//! The node does not discover its own address or watch the link itself; the
//! embedding host supplies both through this seam. Connectivity changes are
//! an explicit `watch` subscription so the controller's watcher task can be
//! cancelled deterministically on shutdown.

use std::net::Ipv4Addr;

use tokio::sync::watch;

use lanpub_core::LanpubResult;

/// Link state as reported by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectivity {
    /// No usable link
    Offline,
    /// Connected over a wired interface
    Wired,
    /// Connected over a wireless interface
    Wireless,
}

/// Capabilities the embedding host provides to the node.
pub trait HostNetwork: Send + Sync {
    /// This device's address on the local subnet.
    fn local_addr(&self) -> LanpubResult<Ipv4Addr>;

    /// The subnet mask of the local interface.
    fn subnet_mask(&self) -> LanpubResult<Ipv4Addr>;

    /// Subscribe to connectivity transitions. The node re-runs its subnet
    /// join sweep whenever the link becomes wireless-connected.
    fn connectivity(&self) -> watch::Receiver<Connectivity>;
}

/// Fixed-address host, for tests and wired deployments.
pub struct StaticHost {
    addr: Ipv4Addr,
    mask: Ipv4Addr,
    tx: watch::Sender<Connectivity>,
    rx: watch::Receiver<Connectivity>,
}

impl StaticHost {
    pub fn new(addr: Ipv4Addr, mask: Ipv4Addr) -> Self {
        let (tx, rx) = watch::channel(Connectivity::Wireless);
        StaticHost { addr, mask, tx, rx }
    }

    /// Report a link transition to subscribers.
    pub fn set_connectivity(&self, state: Connectivity) {
        let _ = self.tx.send(state);
    }
}

impl HostNetwork for StaticHost {
    fn local_addr(&self) -> LanpubResult<Ipv4Addr> {
        Ok(self.addr)
    }

    fn subnet_mask(&self) -> LanpubResult<Ipv4Addr> {
        Ok(self.mask)
    }

    fn connectivity(&self) -> watch::Receiver<Connectivity> {
        self.rx.clone()
    }
}
