//! Protocol router
//!
//! Dispatches inbound requests to the six handlers. Parsing and validation
//! happen before dispatch, so a malformed request is rejected with a 400
//! failure body without touching any table. The lock is held only for table
//! mutation; callbacks and outbound sends run outside it.

use std::net::Ipv4Addr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use lanpub_transport::InboundHandler;
use lanpub_wire::{Message, Reply};

use crate::node::Shared;

/// Cheap cloneable handle the host listener feeds inbound requests into.
#[derive(Clone)]
pub struct Router {
    shared: Arc<Shared>,
}

impl Router {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Router { shared }
    }

    /// Route a raw request as delivered by the host's embedded server.
    pub async fn route(&self, method: &str, path: &str, body: Option<&Value>) -> Reply {
        match Message::parse(method, path, body) {
            Ok(msg) => self.dispatch(msg).await,
            Err(err) => {
                tracing::debug!(method, path, error = %err, "rejected inbound request");
                Reply::failure(&err)
            }
        }
    }

    /// Dispatch an already-validated message.
    pub async fn dispatch(&self, msg: Message) -> Reply {
        match msg {
            Message::Join { requester } => self.on_join(requester),
            Message::Leave { requester } => self.on_leave(requester),
            Message::Healthcheck { requester } => self.on_healthcheck(requester),
            Message::Subscribe { requester, channel } => self.on_subscribe(requester, &channel),
            Message::Unsubscribe { requester, channel } => {
                self.on_unsubscribe(requester, &channel)
            }
            Message::Publish {
                requester,
                channel,
                data,
            } => self.on_publish(requester, &channel, data),
        }
    }

    fn on_join(&self, requester: Ipv4Addr) -> Reply {
        let newly_known = {
            let mut tables = self.shared.tables.lock();
            tables.membership.insert(requester)
        };
        tracing::debug!(peer = %requester, newly_known, "peer joined");

        // Healthcheck the requester back instead of answering with data: it
        // is mid-broadcast and not waiting on this node specifically
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let probe = Message::Healthcheck {
                requester: shared.local_addr,
            };
            let _ = shared
                .transport
                .send(requester, shared.config.port, &probe)
                .await;
        });

        self.shared.notify_peer_joined(requester);
        Reply::ok_empty()
    }

    fn on_leave(&self, requester: Ipv4Addr) -> Reply {
        let was_known = {
            let mut tables = self.shared.tables.lock();
            let was_known = tables.membership.remove(requester);
            tables.channels.purge_address(requester);
            was_known
        };
        tracing::debug!(peer = %requester, was_known, "peer left");
        Reply::success()
    }

    fn on_healthcheck(&self, requester: Ipv4Addr) -> Reply {
        // A probe from an unknown address is an implicit join
        let newly_known = {
            let mut tables = self.shared.tables.lock();
            if tables.membership.contains(requester) {
                false
            } else {
                tables.membership.insert(requester)
            }
        };
        if newly_known {
            tracing::debug!(peer = %requester, "peer discovered via healthcheck");
            self.shared.notify_peer_joined(requester);
        }
        Reply::success()
    }

    fn on_subscribe(&self, requester: Ipv4Addr, channel: &str) -> Reply {
        self.shared
            .tables
            .lock()
            .channels
            .add_subscriber(channel, requester);
        tracing::debug!(peer = %requester, channel, "remote subscribe");
        Reply::success()
    }

    fn on_unsubscribe(&self, requester: Ipv4Addr, channel: &str) -> Reply {
        self.shared
            .tables
            .lock()
            .channels
            .remove_subscriber(channel, requester);
        tracing::debug!(peer = %requester, channel, "remote unsubscribe");
        Reply::success()
    }

    fn on_publish(&self, requester: Ipv4Addr, channel: &str, data: Value) -> Reply {
        let callback = self.shared.tables.lock().channels.callback(channel);
        match callback {
            Some(callback) => callback(&data),
            // No local subscriber: drop silently, no buffering
            None => tracing::debug!(peer = %requester, channel, "publish with no local callback"),
        }
        Reply::success()
    }
}

#[async_trait]
impl InboundHandler for Router {
    async fn handle(&self, msg: Message) -> Reply {
        self.dispatch(msg).await
    }
}
