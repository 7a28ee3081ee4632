//! Shared application state for the API server.
//!
//! [`AppState`] holds the injected [`Store`] handle every controller reads
//! through and the broadcast channel behind the chat `WebSocket`.

use std::sync::Arc;

use agentdesk_db::Store;
use tokio::sync::broadcast;

/// Capacity of the chat broadcast channel.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const CHAT_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Cloned into every route handler. Both fields are reference counted, so
/// clones are cheap and share the same store and channel.
#[derive(Clone)]
pub struct AppState {
    /// Backend for all data-access functions.
    pub store: Arc<dyn Store>,
    /// Broadcast sender for chat messages.
    pub chat: broadcast::Sender<String>,
    /// Whether `GET /ws/chat` is mounted.
    pub chat_enabled: bool,
}

impl AppState {
    /// Create state around `store` with the chat channel enabled.
    pub fn new(store: Arc<dyn Store>) -> Self {
        let (chat, _) = broadcast::channel(CHAT_CAPACITY);
        Self {
            store,
            chat,
            chat_enabled: true,
        }
    }

    /// Enable or disable the chat `WebSocket` route.
    #[must_use]
    pub fn with_chat(mut self, enabled: bool) -> Self {
        self.chat_enabled = enabled;
        self
    }

    /// Subscribe to the chat channel.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.chat.subscribe()
    }

    /// Publish a chat message to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, message: &str) -> usize {
        self.chat.send(message.to_owned()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use agentdesk_db::MemoryStore;

    use super::*;

    #[test]
    fn broadcast_without_subscribers_is_zero() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        assert_eq!(state.broadcast("hello"), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let mut a = state.subscribe();
        let mut b = state.subscribe();

        assert_eq!(state.broadcast("hi"), 2);
        assert_eq!(a.recv().await.unwrap(), "hi");
        assert_eq!(b.recv().await.unwrap(), "hi");
    }

    #[test]
    fn chat_toggle() {
        let state = AppState::new(Arc::new(MemoryStore::new())).with_chat(false);
        assert!(!state.chat_enabled);
    }
}
