//! Node controller
//!
//! Owns the shared tables, the background health-check loop, and the
//! connectivity watcher; runs the subnet join sweep and the public
//! subscribe/unsubscribe/publish operations. All outbound traffic follows
//! the snapshot-then-send discipline: copy the target list under the lock,
//! release it, then fan out.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use lanpub_core::{LanpubError, LanpubResult, NodeConfig};
use lanpub_subnet::SubnetInfo;
use lanpub_transport::{fan_out, BoundedTransport, PeerTransport};
use lanpub_wire::Message;

use crate::channels::{Callback, ChannelRegistry};
use crate::host::{Connectivity, HostNetwork};
use crate::membership::MembershipTable;
use crate::router::Router;

/// Called whenever a peer announces itself (join, or implicit join via
/// healthcheck).
pub type PeerJoinedListener = Arc<dyn Fn(Ipv4Addr) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Tables {
    pub membership: MembershipTable,
    pub channels: ChannelRegistry,
}

/// State shared between the controller, the router, and background tasks.
pub(crate) struct Shared {
    pub config: NodeConfig,
    pub local_addr: Ipv4Addr,
    pub subnet: SubnetInfo,
    pub transport: Arc<dyn PeerTransport>,
    pub tables: Mutex<Tables>,
    peer_joined: Mutex<Option<PeerJoinedListener>>,
}

impl Shared {
    pub fn set_peer_joined(&self, listener: PeerJoinedListener) {
        *self.peer_joined.lock() = Some(listener);
    }

    pub fn notify_peer_joined(&self, addr: Ipv4Addr) {
        // Clone the listener out of the lock; it may call back into the node
        let listener = self.peer_joined.lock().clone();
        if let Some(listener) = listener {
            listener(addr);
        }
    }
}

/// A running LANPUB node.
pub struct Node {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("local_addr", &self.shared.local_addr)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// Start a node: resolve the local subnet, spawn the health-check loop
    /// and connectivity watcher, then announce ourselves across the subnet.
    ///
    /// Every outbound request goes through the supplied transport bounded by
    /// `config.request_timeout`; a peer that stalls past the deadline counts
    /// as no response.
    ///
    /// A host that cannot report its address or mask is fatal; nothing is
    /// spawned on that path.
    pub async fn start(
        config: NodeConfig,
        host: Arc<dyn HostNetwork>,
        transport: Arc<dyn PeerTransport>,
    ) -> LanpubResult<Node> {
        let local_addr = host
            .local_addr()
            .map_err(|e| LanpubError::Startup(format!("cannot resolve local address: {e}")))?;
        let mask = host
            .subnet_mask()
            .map_err(|e| LanpubError::Startup(format!("cannot resolve subnet mask: {e}")))?;
        let subnet = SubnetInfo::compute(local_addr, mask);

        tracing::info!(
            local = %local_addr,
            network = %subnet.network,
            mask_len = subnet.mask_len,
            num_hosts = subnet.num_hosts,
            "starting node"
        );

        let transport: Arc<dyn PeerTransport> =
            Arc::new(BoundedTransport::new(transport, config.request_timeout));

        let shared = Arc::new(Shared {
            config,
            local_addr,
            subnet,
            transport,
            tables: Mutex::new(Tables::default()),
            peer_joined: Mutex::new(None),
        });

        let tasks = vec![
            tokio::spawn(health_loop(Arc::clone(&shared))),
            tokio::spawn(connectivity_watch(Arc::clone(&shared), host.connectivity())),
        ];

        let node = Node { shared, tasks };
        node.join_sweep().await;
        Ok(node)
    }

    /// Handle for the host's embedded server to route inbound requests.
    pub fn router(&self) -> Router {
        Router::new(Arc::clone(&self.shared))
    }

    /// This node's address on the subnet.
    pub fn local_addr(&self) -> Ipv4Addr {
        self.shared.local_addr
    }

    /// The subnet snapshot computed at startup.
    pub fn subnet(&self) -> SubnetInfo {
        self.shared.subnet
    }

    /// Known peers and their last-observed reachability.
    pub fn peers(&self) -> HashMap<Ipv4Addr, bool> {
        self.shared.tables.lock().membership.snapshot()
    }

    /// Register a callback fired whenever a peer announces itself.
    pub fn register_peer_joined_listener(&self, listener: PeerJoinedListener) {
        self.shared.set_peer_joined(listener);
    }

    /// Announce this node to every host address in the subnet's usable
    /// range. Linear broadcast substitute: one unicast join per address,
    /// skipping our own.
    pub async fn join_sweep(&self) {
        join_sweep(&self.shared).await;
    }

    /// Subscribe locally and tell every known peer to add us to the
    /// channel's subscriber set. Peer notification is best-effort and
    /// unordered.
    pub async fn subscribe(&self, channel: &str, callback: Callback) {
        let targets = {
            let mut tables = self.shared.tables.lock();
            tables
                .channels
                .set_callback(channel, callback, self.shared.local_addr);
            tables.membership.addresses()
        };
        tracing::debug!(channel, peers = targets.len(), "local subscribe");
        let msg = Message::Subscribe {
            requester: self.shared.local_addr,
            channel: channel.to_string(),
        };
        self.fan_out(targets, msg).await;
    }

    /// Drop the local subscription and tell every known peer to forget us.
    pub async fn unsubscribe(&self, channel: &str) {
        let targets = {
            let mut tables = self.shared.tables.lock();
            tables
                .channels
                .clear_callback(channel, self.shared.local_addr);
            tables.membership.addresses()
        };
        tracing::debug!(channel, "local unsubscribe");
        let msg = Message::Unsubscribe {
            requester: self.shared.local_addr,
            channel: channel.to_string(),
        };
        self.fan_out(targets, msg).await;
    }

    /// Publish to every remote address in the channel's subscriber set.
    /// Single-hop, at-most-once, unordered across peers.
    pub async fn publish(&self, channel: &str, data: Value) {
        let targets: Vec<Ipv4Addr> = {
            let tables = self.shared.tables.lock();
            tables
                .channels
                .subscribers(channel)
                .into_iter()
                .filter(|addr| *addr != self.shared.local_addr)
                .collect()
        };
        tracing::debug!(channel, subscribers = targets.len(), "publish");
        let msg = Message::Publish {
            requester: self.shared.local_addr,
            channel: channel.to_string(),
            data,
        };
        self.fan_out(targets, msg).await;
    }

    /// Run one health-check sweep immediately, outside the timer.
    pub async fn healthcheck_sweep(&self) {
        healthcheck_sweep(&self.shared).await;
    }

    /// Broadcast a leave notice and stop the background tasks. Undelivered
    /// leave notices are logged and shutdown proceeds regardless; tearing
    /// down the host's listener is the host's job.
    pub async fn stop(self) {
        let targets = self.shared.tables.lock().membership.addresses();
        if !targets.is_empty() {
            let msg = Message::Leave {
                requester: self.shared.local_addr,
            };
            let results = fan_out(
                Arc::clone(&self.shared.transport),
                self.shared.config.port,
                targets,
                msg,
                self.shared.config.sweep_concurrency,
            )
            .await;
            let missed = results.iter().filter(|(_, reply)| reply.is_none()).count();
            if missed > 0 {
                tracing::warn!(missed, "leave notice not delivered to all peers");
            }
        }

        for task in &self.tasks {
            task.abort();
        }
        tracing::info!(local = %self.shared.local_addr, "node stopped");
    }

    async fn fan_out(&self, targets: Vec<Ipv4Addr>, msg: Message) {
        let _ = fan_out(
            Arc::clone(&self.shared.transport),
            self.shared.config.port,
            targets,
            msg,
            self.shared.config.sweep_concurrency,
        )
        .await;
    }
}

async fn join_sweep(shared: &Arc<Shared>) {
    let local = shared.local_addr;
    let targets: Vec<Ipv4Addr> = shared
        .subnet
        .hosts()
        .filter(|addr| *addr != local)
        .collect();
    tracing::info!(targets = targets.len(), "subnet join sweep");

    let msg = Message::Join { requester: local };
    let _ = fan_out(
        Arc::clone(&shared.transport),
        shared.config.port,
        targets,
        msg,
        shared.config.sweep_concurrency,
    )
    .await;
}

/// One pass over the membership table: probe everyone, record the outcome.
/// Unreachable peers stay in the table and get probed again next tick.
async fn healthcheck_sweep(shared: &Arc<Shared>) {
    let targets = shared.tables.lock().membership.addresses();
    if targets.is_empty() {
        return;
    }

    let msg = Message::Healthcheck {
        requester: shared.local_addr,
    };
    let results = fan_out(
        Arc::clone(&shared.transport),
        shared.config.port,
        targets,
        msg,
        shared.config.sweep_concurrency,
    )
    .await;

    let mut tables = shared.tables.lock();
    for (peer, reply) in results {
        let reachable = reply.map(|r| r.is_success()).unwrap_or(false);
        if !reachable {
            tracing::debug!(peer = %peer, "health check failed");
        }
        tables.membership.mark(peer, reachable);
    }
}

async fn health_loop(shared: Arc<Shared>) {
    let mut interval = tokio::time::interval(shared.config.healthcheck_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick fires immediately; the startup sweep already announced us
    interval.tick().await;
    loop {
        interval.tick().await;
        healthcheck_sweep(&shared).await;
    }
}

async fn connectivity_watch(shared: Arc<Shared>, mut rx: watch::Receiver<Connectivity>) {
    while rx.changed().await.is_ok() {
        let state = *rx.borrow();
        if state == Connectivity::Wireless {
            tracing::info!("wireless link up, re-announcing on subnet");
            join_sweep(&shared).await;
        }
    }
}
