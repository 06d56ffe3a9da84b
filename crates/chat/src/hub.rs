//! The relay hub: one broadcast group per conversation.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::events::ServerEvent;

const CHANNEL_CAPACITY: usize = 100;

/// Fans relay events out to the sockets currently joined to each
/// conversation. Delivery is at-most-once: events published to a group
/// with no subscribers are dropped, and lagging receivers lose the
/// oldest events.
#[derive(Clone, Default)]
pub struct ConversationHub {
    channels: Arc<RwLock<HashMap<i64, broadcast::Sender<ServerEvent>>>>,
}

impl ConversationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a conversation's broadcast group
    pub async fn subscribe(&self, conversation_id: i64) -> broadcast::Receiver<ServerEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to everyone joined to the conversation.
    /// Returns the number of receivers the event reached.
    pub async fn publish(&self, conversation_id: i64, event: ServerEvent) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&conversation_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop the broadcast group if nobody is subscribed anymore.
    /// Called when a socket leaves a conversation.
    pub async fn prune(&self, conversation_id: i64) {
        let mut channels = self.channels.write().await;
        if let Some(sender) = channels.get(&conversation_id) {
            if sender.receiver_count() == 0 {
                channels.remove(&conversation_id);
                debug!(conversation_id, "pruned idle relay channel");
            }
        }
    }

    /// Number of live broadcast groups
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}
