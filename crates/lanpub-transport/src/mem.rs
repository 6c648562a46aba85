//! In-memory mesh transport
//!
//! Wires any number of in-process nodes together without sockets: each node
//! registers an inbound handler under its address, and sends resolve through
//! the shared registry. Addresses can be partitioned to simulate silent
//! peers, which is how tests drive the reachable/unreachable state machine.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use lanpub_wire::{Message, Reply};

use crate::PeerTransport;

/// Receiving side of a mesh endpoint.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, msg: Message) -> Reply;
}

#[derive(Default)]
struct MeshState {
    handlers: HashMap<Ipv4Addr, Arc<dyn InboundHandler>>,
    partitioned: HashSet<Ipv4Addr>,
}

/// Shared in-memory network linking registered endpoints.
#[derive(Default)]
pub struct MemoryMesh {
    state: Mutex<MeshState>,
}

impl MemoryMesh {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Attach an endpoint at `addr`. Replaces any previous handler.
    pub fn register(&self, addr: Ipv4Addr, handler: Arc<dyn InboundHandler>) {
        self.state.lock().handlers.insert(addr, handler);
    }

    /// Detach the endpoint at `addr`; sends to it yield no response.
    pub fn unregister(&self, addr: Ipv4Addr) {
        self.state.lock().handlers.remove(&addr);
    }

    /// Make `addr` stop responding without detaching it.
    pub fn partition(&self, addr: Ipv4Addr) {
        self.state.lock().partitioned.insert(addr);
    }

    /// Undo a partition.
    pub fn heal(&self, addr: Ipv4Addr) {
        self.state.lock().partitioned.remove(&addr);
    }
}

#[async_trait]
impl PeerTransport for MemoryMesh {
    async fn send(&self, peer: Ipv4Addr, _port: u16, msg: &Message) -> Option<Reply> {
        let handler = {
            let state = self.state.lock();
            if state.partitioned.contains(&peer) {
                return None;
            }
            state.handlers.get(&peer).cloned()
        };
        // Lock released before the handler runs: a handler may send back
        // through the mesh
        match handler {
            Some(handler) => Some(handler.handle(msg.clone()).await),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    #[async_trait]
    impl InboundHandler for EchoHandler {
        async fn handle(&self, _msg: Message) -> Reply {
            Reply::success()
        }
    }

    fn probe() -> Message {
        Message::Healthcheck {
            requester: "10.0.0.1".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_registered_endpoint_replies() {
        let mesh = MemoryMesh::new();
        let addr: Ipv4Addr = "10.0.0.2".parse().unwrap();
        mesh.register(addr, Arc::new(EchoHandler));

        assert_eq!(mesh.send(addr, 3103, &probe()).await, Some(Reply::success()));
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_silent() {
        let mesh = MemoryMesh::new();
        let addr: Ipv4Addr = "10.0.0.3".parse().unwrap();
        assert!(mesh.send(addr, 3103, &probe()).await.is_none());
    }

    #[tokio::test]
    async fn test_partition_and_heal() {
        let mesh = MemoryMesh::new();
        let addr: Ipv4Addr = "10.0.0.2".parse().unwrap();
        mesh.register(addr, Arc::new(EchoHandler));

        mesh.partition(addr);
        assert!(mesh.send(addr, 3103, &probe()).await.is_none());

        mesh.heal(addr);
        assert!(mesh.send(addr, 3103, &probe()).await.is_some());
    }
}
