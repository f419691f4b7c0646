//! Session registry for live channels and broadcast fan-out.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::events::Outbound;
use crate::store::Store;

/// Size of the per-channel send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// Process-unique identifier of a connected channel.
pub type ChannelId = u64;

/// Kind of transport behind a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Chat,
    Signal,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Signal => write!(f, "signal"),
        }
    }
}

struct ChannelHandle {
    id: ChannelId,
    kind: ChannelKind,
    tx: mpsc::Sender<Outbound>,
}

/// Registry of live channels, keyed by session id.
///
/// Owns join/leave and broadcast fan-out. Mutations of one session's channel
/// set are serialized by the map's entry locking; broadcasts iterate a
/// snapshot of the set so concurrent joins and leaves never invalidate a
/// delivery in progress. Independent sessions do not contend.
///
/// The store handle is used for the persisted connected-device counter. The
/// counter is best effort: update failures are logged and do not fail the
/// join or leave.
pub struct SessionRegistry {
    channels: DashMap<String, Vec<ChannelHandle>>,
    next_id: AtomicU64,
    store: Arc<dyn Store>,
}

impl SessionRegistry {
    /// Create a new registry backed by the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            channels: DashMap::new(),
            next_id: AtomicU64::new(1),
            store,
        }
    }

    /// Create an outbound queue pair sized for one channel.
    pub fn channel() -> (mpsc::Sender<Outbound>, mpsc::Receiver<Outbound>) {
        mpsc::channel(CONNECTION_BUFFER_SIZE)
    }

    /// Register a channel under a session id.
    ///
    /// Increments the session's persisted device counter.
    pub async fn join(
        &self,
        session_id: &str,
        kind: ChannelKind,
        tx: mpsc::Sender<Outbound>,
    ) -> ChannelId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.channels
            .entry(session_id.to_string())
            .or_default()
            .push(ChannelHandle { id, kind, tx });

        info!(session_id = %session_id, channel = id, kind = %kind, "channel joined session");

        if let Err(e) = self.store.increment_device_count(session_id, 1).await {
            warn!(session_id = %session_id, error = %e, "failed to bump device count");
        }
        id
    }

    /// Remove a channel from a session.
    ///
    /// Decrements the persisted device counter (clamped at zero by the
    /// store). Unknown channel ids are ignored.
    pub async fn leave(&self, session_id: &str, channel: ChannelId) {
        if !self.remove_channel(session_id, channel) {
            return;
        }

        info!(session_id = %session_id, channel = channel, "channel left session");

        if let Err(e) = self.store.increment_device_count(session_id, -1).await {
            warn!(session_id = %session_id, error = %e, "failed to drop device count");
        }
    }

    /// Deliver a payload to every channel registered under `session_id`,
    /// except `exclude`.
    ///
    /// A channel whose receiver is gone is removed from the set and delivery
    /// continues; a dead peer never aborts delivery to the rest.
    pub async fn broadcast(&self, session_id: &str, outbound: Outbound, exclude: Option<ChannelId>) {
        let targets: Vec<(ChannelId, mpsc::Sender<Outbound>)> = match self.channels.get(session_id)
        {
            Some(entry) => entry
                .iter()
                .filter(|c| Some(c.id) != exclude)
                .map(|c| (c.id, c.tx.clone()))
                .collect(),
            None => return,
        };

        let mut dead = Vec::new();
        for (id, tx) in targets {
            if tx.send(outbound.clone()).await.is_err() {
                dead.push(id);
            }
        }

        for id in dead {
            if self.remove_channel(session_id, id) {
                debug!(session_id = %session_id, channel = id, "pruned unreachable channel");
                if let Err(e) = self.store.increment_device_count(session_id, -1).await {
                    warn!(session_id = %session_id, error = %e, "failed to drop device count");
                }
            }
        }
    }

    /// Number of channels currently registered under a session.
    pub fn channel_count(&self, session_id: &str) -> usize {
        self.channels
            .get(session_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Remove a channel, returning whether it was present. Empty session
    /// entries are discarded so the map only holds live sessions.
    fn remove_channel(&self, session_id: &str, channel: ChannelId) -> bool {
        let removed = match self.channels.get_mut(session_id) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|c| c.id != channel);
                entry.len() != before
            }
            None => false,
        };

        // Clean up empty entries
        self.channels.retain(|_, v| !v.is_empty());
        removed
    }
}
