use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alchemy_core::{Audience, Broadcast};
use alchemy_types::EventPayload;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::registry::{PlayerKey, SessionRegistry};

/// Events a subscriber may fall behind by before new ones are dropped.
pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionKind {
    Anonymous,
    Player(PlayerKey),
}

struct Subscriber {
    kind: SubscriptionKind,
    sender: mpsc::Sender<EventPayload>,
}

pub struct EventBus {
    next_id: AtomicU64,
    channels: DashMap<ChannelId, Subscriber>,
    registry: Arc<SessionRegistry>,
}

impl EventBus {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            channels: DashMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn subscribe(&self, kind: SubscriptionKind) -> (ChannelId, mpsc::Receiver<EventPayload>) {
        let id = ChannelId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);

        if let SubscriptionKind::Player(key) = &kind {
            self.registry.bind_player(key.clone(), id);
        }
        debug!(channel = %id, ?kind, "Subscriber connected");
        self.channels.insert(id, Subscriber { kind, sender });
        (id, receiver)
    }

    pub fn unsubscribe(&self, id: ChannelId) {
        if let Some((_, subscriber)) = self.channels.remove(&id) {
            if let SubscriptionKind::Player(key) = &subscriber.kind {
                self.registry.release_channel(key, id);
            }
            debug!(channel = %id, "Subscriber disconnected");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.channels.len()
    }

    fn try_deliver(id: ChannelId, subscriber: &Subscriber, payload: &EventPayload) -> bool {
        match subscriber.sender.try_send(payload.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(channel = %id, "Subscriber channel full, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(channel = %id, "Subscriber channel closed");
                false
            }
        }
    }

    fn deliver_to(&self, ids: &[ChannelId], payload: &EventPayload) -> usize {
        ids.iter()
            .filter(|&&id| {
                self.channels
                    .get(&id)
                    .is_some_and(|subscriber| Self::try_deliver(id, &subscriber, payload))
            })
            .count()
    }

    /// Returns how many subscribers accepted the event.
    pub fn publish_all(&self, payload: impl Into<EventPayload>) -> usize {
        let payload = payload.into();
        self.channels
            .iter()
            .filter(|entry| Self::try_deliver(*entry.key(), entry.value(), &payload))
            .count()
    }

    pub fn publish_to_lobby(&self, lobby_code: &str, payload: impl Into<EventPayload>) -> usize {
        let ids = self.registry.lobby_channels(lobby_code);
        self.deliver_to(&ids, &payload.into())
    }

    pub fn publish_to_player(
        &self,
        lobby_code: &str,
        player_name: &str,
        payload: impl Into<EventPayload>,
    ) -> usize {
        match self.registry.player_channel(lobby_code, player_name) {
            Some(id) => self.deliver_to(&[id], &payload.into()),
            None => {
                debug!(lobby_code, player = player_name, "No subscriber for player event");
                0
            }
        }
    }

    pub fn publish(&self, broadcast: Broadcast) -> usize {
        match broadcast.audience {
            Audience::Everyone => self.publish_all(broadcast.payload),
            Audience::Lobby(lobby_code) => self.publish_to_lobby(&lobby_code, broadcast.payload),
            Audience::Player {
                lobby_code,
                player_name,
            } => self.publish_to_player(&lobby_code, &player_name, broadcast.payload),
        }
    }
}
