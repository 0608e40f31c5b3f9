use serde::{Deserialize, Serialize};

use std::fmt;

/// Avatar shown when the persona has no `profile_image_url`.
pub const DEFAULT_AVATAR_URL: &str =
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQZTfeZyVr7GyW1ygsIqMmADllxP3iwG1h6gw&s";

/// Opaque persona identifier as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(pub String);

impl PersonaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The AI chat counterpart's displayed identity.
///
/// Fetched once from `GET /v1/personas/latest` and never mutated afterwards.
/// Only `id` and `public_name` are required; the backend sends more fields
/// than the client renders and unknown ones are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    /// Name shown in the header and as the bot's label.
    pub public_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// First bot message of every fresh conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl Persona {
    /// Title used for the window/page hosting the conversation.
    pub fn page_title(&self) -> String {
        format!("{} - Ask Me Anything", self.public_name)
    }

    /// Avatar to display, falling back to [`DEFAULT_AVATAR_URL`].
    pub fn avatar_url(&self) -> &str {
        self.profile_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_AVATAR_URL)
    }

    /// Welcome text, treating an empty string the same as a missing one.
    pub fn welcome(&self) -> Option<&str> {
        self.welcome_message.as_deref().filter(|w| !w.is_empty())
    }
}
