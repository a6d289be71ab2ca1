//! In-process notifications: sign-in/sign-out and new emojis.
//!
//! Anything holding the [`EventBus`] can emit; listeners subscribe and only
//! see events sent after they subscribed.

use tokio::sync::broadcast;

use crate::auth::AuthUser;

#[derive(Debug, Clone)]
pub enum Event {
    /// Someone signed in (`Some`) or out (`None`).
    AuthStateChanged { user: Option<AuthUser> },
    /// A generated emoji was persisted (carries its id).
    EmojiCreated { id: String },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthStateChanged { .. } => "auth_state_changed",
            Self::EmojiCreated { .. } => "emoji_created",
        }
    }
}

#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns how many listeners will see the event.
    pub fn emit(&self, event: Event) -> usize {
        let kind = event.kind();
        let listeners = self.tx.send(event).unwrap_or(0);
        tracing::debug!(kind, listeners, "event emitted");
        listeners
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

/// Wait for the next auth state change, skipping other events. A listener
/// that fell behind resumes from the oldest event still buffered. `None`
/// once the bus is gone.
pub async fn next_auth_change(rx: &mut broadcast::Receiver<Event>) -> Option<Option<AuthUser>> {
    loop {
        match rx.recv().await {
            Ok(Event::AuthStateChanged { user }) => return Some(user),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "auth listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
