//! Event bus for decoupled communication between client modules.
//!
//! Built on `tokio::sync::broadcast`: any module can emit a typed
//! [`ClientEvent`] and any number of subscribers consume them independently.
//! The composition root uses it to react to auth transitions (logging out
//! resets the player session); UI hosts subscribe to player events to refresh
//! transport controls.
//!
//! Subscribers that fall behind receive `RecvError::Lagged` and should simply
//! continue; `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum ClientEvent {
    /// Authentication-related events
    Auth(AuthEvent),
    /// Playback-related events
    Player(PlayerEvent),
}

impl ClientEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ClientEvent::Auth(e) => e.description(),
            ClientEvent::Player(e) => e.description(),
        }
    }
}

/// Events related to the authentication session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// User authenticated (login or registration).
    SignedIn {
        /// Identifier of the authenticated user.
        user_id: String,
    },
    /// A persisted session was restored at startup.
    SessionRestored { user_id: String },
    /// User signed out. Also emitted when a 401 response invalidates the
    /// stored token.
    SignedOut { user_id: Option<String> },
    /// Authentication attempt failed.
    AuthFailed { message: String },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SignedIn { .. } => "User signed in",
            AuthEvent::SessionRestored { .. } => "Stored session restored",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::AuthFailed { .. } => "Authentication failed",
        }
    }
}

/// Events emitted by the player session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// A track started playing.
    Started { track_id: String },
    /// Playback paused.
    Paused,
    /// Playback resumed from pause.
    Resumed,
    /// A track finished naturally.
    TrackCompleted { track_id: String },
    /// The last queued track finished; the session went idle.
    QueueEnded,
    /// A source failed to load; the session stays on the failed track.
    LoadFailed {
        track_id: String,
        message: String,
    },
}

impl PlayerEvent {
    fn description(&self) -> &str {
        match self {
            PlayerEvent::Started { .. } => "Playback started",
            PlayerEvent::Paused => "Playback paused",
            PlayerEvent::Resumed => "Playback resumed",
            PlayerEvent::TrackCompleted { .. } => "Track completed",
            PlayerEvent::QueueEnded => "Queue exhausted",
            PlayerEvent::LoadFailed { .. } => "Track load failed",
        }
    }
}

/// Central broadcast channel for client events.
///
/// Cheap to clone; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create an event bus with the given channel capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event. Emitting
    /// with no subscribers is not an error.
    pub fn emit(&self, event: ClientEvent) -> usize {
        tracing::trace!(event = event.description(), "emitting client event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all events emitted after this call.
    pub fn subscribe(&self) -> Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let delivered = bus.emit(ClientEvent::Auth(AuthEvent::SignedIn {
            user_id: "user-1".to_string(),
        }));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ClientEvent::Auth(AuthEvent::SignedIn {
                user_id: "user-1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(8);
        assert_eq!(bus.emit(ClientEvent::Player(PlayerEvent::Paused)), 0);
    }

    #[tokio::test]
    async fn subscribers_are_independent() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(ClientEvent::Player(PlayerEvent::QueueEnded));

        assert_eq!(
            a.recv().await.unwrap(),
            ClientEvent::Player(PlayerEvent::QueueEnded)
        );
        assert_eq!(
            b.recv().await.unwrap(),
            ClientEvent::Player(PlayerEvent::QueueEnded)
        );
    }

    #[test]
    fn event_serialization_round_trip() {
        let event = ClientEvent::Player(PlayerEvent::LoadFailed {
            track_id: "t-9".to_string(),
            message: "connection refused".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let parsed: ClientEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
