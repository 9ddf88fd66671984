use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in a completion request (provider-agnostic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// ── Convenience constructors ───────────────────────────────────────

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }
}

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One turn of the visible conversation transcript.
///
/// The transcript ordering is the sole source of conversational context
/// passed to the general-completion fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Map a transcript turn to a completion message role.
impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        match turn.speaker {
            Speaker::User => Message::user(turn.text.clone()),
            Speaker::Bot => Message::assistant(turn.text.clone()),
        }
    }
}
