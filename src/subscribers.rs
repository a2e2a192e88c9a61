//! In-memory registry of chats subscribed to the daily broadcast.
//!
//! The registry lives for the process lifetime only; a restart starts empty.

use std::collections::HashSet;

use tokio::sync::RwLock;
use tracing::info;

use crate::telegram::ChatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    NotSubscribed,
}

/// Set of subscribed chats, shared by handle between the dispatcher and the
/// scheduler.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    chats: RwLock<HashSet<ChatId>>,
}

impl SubscriberRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, chat_id: ChatId) -> SubscribeOutcome {
        let mut chats = self.chats.write().await;
        if chats.insert(chat_id) {
            info!("Chat {} subscribed ({} total)", chat_id, chats.len());
            SubscribeOutcome::Subscribed
        } else {
            SubscribeOutcome::AlreadySubscribed
        }
    }

    pub async fn unsubscribe(&self, chat_id: ChatId) -> UnsubscribeOutcome {
        let mut chats = self.chats.write().await;
        if chats.remove(&chat_id) {
            info!("Chat {} unsubscribed ({} total)", chat_id, chats.len());
            UnsubscribeOutcome::Unsubscribed
        } else {
            UnsubscribeOutcome::NotSubscribed
        }
    }

    /// Copies the current members, sorted, so iteration holds no lock.
    pub async fn snapshot(&self) -> Vec<ChatId> {
        let mut members: Vec<ChatId> = self.chats.read().await.iter().copied().collect();
        members.sort_unstable();
        members
    }

    pub async fn contains(&self, chat_id: ChatId) -> bool {
        self.chats.read().await.contains(&chat_id)
    }

    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chats.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_double_subscribe() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.subscribe(ChatId(1)).await, SubscribeOutcome::Subscribed);
        assert_eq!(
            registry.subscribe(ChatId(1)).await,
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_subscribe_then_unsubscribe_restores() {
        let registry = SubscriberRegistry::new();
        registry.subscribe(ChatId(5)).await;
        let before = registry.snapshot().await;

        registry.subscribe(ChatId(7)).await;
        assert!(registry.contains(ChatId(7)).await);
        assert_eq!(
            registry.unsubscribe(ChatId(7)).await,
            UnsubscribeOutcome::Unsubscribed
        );

        assert_eq!(registry.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown() {
        let registry = SubscriberRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(
            registry.unsubscribe(ChatId(3)).await,
            UnsubscribeOutcome::NotSubscribed
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let registry = SubscriberRegistry::new();
        registry.subscribe(ChatId(2)).await;
        registry.subscribe(ChatId(1)).await;

        let snapshot = registry.snapshot().await;
        registry.subscribe(ChatId(3)).await;

        assert_eq!(snapshot, vec![ChatId(1), ChatId(2)]);
        assert_eq!(registry.len().await, 3);
    }
}
