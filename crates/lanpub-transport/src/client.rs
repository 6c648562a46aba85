//! Peer transport seam and timeout bounding

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use lanpub_wire::{Message, Reply};

/// A single best-effort request to a peer.
///
/// `None` means "no response" — the peer timed out, refused, or was never
/// there. Callers treat absence as "currently unreachable", never as a fatal
/// condition. No retries, no queueing.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn send(&self, peer: Ipv4Addr, port: u16, msg: &Message) -> Option<Reply>;
}

#[async_trait]
impl<T: PeerTransport + ?Sized> PeerTransport for Arc<T> {
    async fn send(&self, peer: Ipv4Addr, port: u16, msg: &Message) -> Option<Reply> {
        (**self).send(peer, port, msg).await
    }
}

/// Wraps a transport with a fixed per-request timeout.
///
/// A request that outlives the deadline is abandoned and reported as no
/// response, matching the fire-and-forget contract.
pub struct BoundedTransport<T> {
    inner: T,
    timeout: Duration,
}

impl<T: PeerTransport> BoundedTransport<T> {
    pub fn new(inner: T, timeout: Duration) -> Self {
        BoundedTransport { inner, timeout }
    }
}

#[async_trait]
impl<T: PeerTransport> PeerTransport for BoundedTransport<T> {
    async fn send(&self, peer: Ipv4Addr, port: u16, msg: &Message) -> Option<Reply> {
        match tokio::time::timeout(self.timeout, self.inner.send(peer, port, msg)).await {
            Ok(reply) => reply,
            Err(_) => {
                tracing::debug!(peer = %peer, path = msg.path(), "request timed out");
                None
            }
        }
    }
}

/// Send one message to many peers with at most `concurrency` in flight.
///
/// Returns `(peer, reply)` pairs in completion order. Used by the subnet
/// join sweep and the health-check loop; callers that only care about the
/// side effect drop the result.
pub async fn fan_out(
    transport: Arc<dyn PeerTransport>,
    port: u16,
    targets: Vec<Ipv4Addr>,
    msg: Message,
    concurrency: usize,
) -> Vec<(Ipv4Addr, Option<Reply>)> {
    let limit = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for peer in targets {
        let transport = Arc::clone(&transport);
        let limit = Arc::clone(&limit);
        let msg = msg.clone();
        tasks.spawn(async move {
            // Semaphore is never closed, acquire cannot fail
            let _permit = limit.acquire_owned().await.ok();
            let reply = transport.send(peer, port, &msg).await;
            (peer, reply)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(result) = joined {
            results.push(result);
        }
    }
    results
}
