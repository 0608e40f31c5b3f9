//! Session and message types for askme conversations.
//!
//! A conversation is an append-only list of [`Message`]s exchanged with the
//! persona over one server-side session, identified by a [`SessionId`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Opaque handle for one conversation's server-side state.
///
/// Replaced wholesale when the session is re-initialized; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for banners and log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Body of `GET /v1/chat/init/{persona_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInitResponse {
    pub session_id: SessionId,
}

/// Body of `POST /v1/chat/stream/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInvokeRequest {
    pub input_message: String,
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single entry in the conversation log.
///
/// Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            sender,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_serde() {
        let json = serde_json::to_string(&Sender::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
        let parsed: Sender = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Sender::User);
    }

    #[test]
    fn test_sender_from_str() {
        assert_eq!("USER".parse::<Sender>().unwrap(), Sender::User);
        assert!("assistant".parse::<Sender>().is_err());
    }

    #[test]
    fn test_message_ids_are_unique_and_ordered() {
        let a = Message::user("hi");
        let b = Message::bot("hello");
        assert_ne!(a.id, b.id);
        assert!(a.id < b.id);
        assert_eq!(a.sender, Sender::User);
        assert_eq!(b.sender, Sender::Bot);
    }

    #[test]
    fn test_session_id_short() {
        let id = SessionId::from("0b9d2f7c-1111-2222-3333-444455556666");
        assert_eq!(id.short(), "0b9d2f7c");
        assert_eq!(SessionId::from("abc").short(), "abc");
    }

    #[test]
    fn test_invoke_request_wire_shape() {
        let body = ChatInvokeRequest {
            input_message: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"input_message":"hello"}"#
        );
    }

    #[test]
    fn test_init_response_parse() {
        let resp: ChatInitResponse = serde_json::from_str(r#"{"session_id":"s-1"}"#).unwrap();
        assert_eq!(resp.session_id, SessionId::from("s-1"));
        assert_eq!(resp.session_id.short(), "s-1");
    }
}
