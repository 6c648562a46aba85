//! Channel registry
//!
//! Two coupled views per channel: the subscriber addresses used to route
//! outbound publishes, and the optional local callback that accepts inbound
//! ones. A channel exists while it has at least one subscriber or a
//! callback, and disappears the moment both are gone.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;

use serde_json::Value;

/// Local delivery callback, invoked with the published payload.
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Channel {
    subscribers: HashSet<Ipv4Addr>,
    callback: Option<Callback>,
}

impl Channel {
    fn is_empty(&self) -> bool {
        self.subscribers.is_empty() && self.callback.is_none()
    }
}

/// All channels this node knows about.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the local callback and make `local` a subscriber.
    pub fn set_callback(&mut self, channel: &str, callback: Callback, local: Ipv4Addr) {
        let entry = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| Channel {
                subscribers: HashSet::new(),
                callback: None,
            });
        entry.callback = Some(callback);
        entry.subscribers.insert(local);
    }

    /// Drop the local callback and `local`'s membership. Returns true if the
    /// channel was known.
    pub fn clear_callback(&mut self, channel: &str, local: Ipv4Addr) -> bool {
        let Some(entry) = self.channels.get_mut(channel) else {
            return false;
        };
        entry.callback = None;
        entry.subscribers.remove(&local);
        if entry.is_empty() {
            self.channels.remove(channel);
        }
        true
    }

    /// Add a remote subscriber (inbound subscribe). Set semantics: adding an
    /// existing address changes nothing.
    pub fn add_subscriber(&mut self, channel: &str, addr: Ipv4Addr) {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| Channel {
                subscribers: HashSet::new(),
                callback: None,
            })
            .subscribers
            .insert(addr);
    }

    /// Remove a remote subscriber (inbound unsubscribe); drops the channel
    /// once empty.
    pub fn remove_subscriber(&mut self, channel: &str, addr: Ipv4Addr) {
        if let Some(entry) = self.channels.get_mut(channel) {
            entry.subscribers.remove(&addr);
            if entry.is_empty() {
                self.channels.remove(channel);
            }
        }
    }

    /// Purge `addr` from every channel (peer left), dropping channels left
    /// with no subscribers and no callback.
    pub fn purge_address(&mut self, addr: Ipv4Addr) {
        self.channels.retain(|_, entry| {
            entry.subscribers.remove(&addr);
            !entry.is_empty()
        });
    }

    /// The local callback for a channel, if subscribed.
    pub fn callback(&self, channel: &str) -> Option<Callback> {
        self.channels.get(channel).and_then(|c| c.callback.clone())
    }

    /// Subscriber addresses for a channel.
    pub fn subscribers(&self, channel: &str) -> Vec<Ipv4Addr> {
        self.channels
            .get(channel)
            .map(|c| c.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
