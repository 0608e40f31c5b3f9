//! Published conversation state.
//!
//! `ChatState` is everything a presentation layer needs to draw the chat:
//! the persona header, the message log, the live "typing" buffer, and the
//! flags that gate the input box.

use std::fmt;

use askme_types::chat::{Message, SessionId};
use askme_types::persona::Persona;

/// Connectivity of the controller to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Startup, or recovery of a lost session, has not finished yet.
    #[default]
    Uninitialized,
    /// A session is open; every exchange uses this id.
    Online(SessionId),
    /// Startup or session recovery failed. Not retried automatically.
    Offline,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Uninitialized => write!(f, "connecting"),
            ConnectionState::Online(_) => write!(f, "online"),
            ConnectionState::Offline => write!(f, "offline"),
        }
    }
}

/// Snapshot of a conversation.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub persona: Option<Persona>,
    pub connection: ConnectionState,
    /// Finalized messages, oldest first.
    pub messages: Vec<Message>,
    /// Partial bot reply of the exchange in flight. Empty otherwise.
    pub streaming: String,
    /// True while an exchange is in flight.
    pub loading: bool,
}

impl ChatState {
    pub fn online(&self) -> bool {
        matches!(self.connection, ConnectionState::Online(_))
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        match &self.connection {
            ConnectionState::Online(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the input surface should accept a message right now.
    pub fn can_send(&self) -> bool {
        self.online() && self.persona.is_some() && !self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askme_types::persona::PersonaId;

    #[test]
    fn test_default_state_cannot_send() {
        let state = ChatState::default();
        assert_eq!(state.connection, ConnectionState::Uninitialized);
        assert!(!state.online());
        assert!(!state.can_send());
        assert!(state.session_id().is_none());
    }

    #[test]
    fn test_can_send_requires_idle_online_persona() {
        let mut state = ChatState {
            persona: Some(Persona {
                id: PersonaId::from("p"),
                public_name: "Luna".to_string(),
                username: None,
                bio: None,
                tagline: None,
                welcome_message: None,
                profile_image_url: None,
            }),
            connection: ConnectionState::Online(SessionId::from("s")),
            ..ChatState::default()
        };
        assert!(state.can_send());
        assert_eq!(state.session_id().map(SessionId::as_str), Some("s"));

        state.loading = true;
        assert!(!state.can_send());

        state.loading = false;
        state.connection = ConnectionState::Offline;
        assert!(!state.can_send());
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Uninitialized.to_string(), "connecting");
        assert_eq!(
            ConnectionState::Online(SessionId::from("s")).to_string(),
            "online"
        );
        assert_eq!(ConnectionState::Offline.to_string(), "offline");
    }
}
