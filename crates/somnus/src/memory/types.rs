//! Memory types for the Somnus system
//!
//! Defines the records held by each memory tier: conversational messages
//! for working memory and timestamped events for episodic memory.

use serde::{Deserialize, Serialize};

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl Role {
    /// Convert role to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single conversational turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who spoke
    pub role: Role,
    /// What was said
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A raw observed event in episodic memory.
///
/// `time` is seconds since the UNIX epoch with sub-second precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicEvent {
    /// The observed text
    pub content: String,
    /// When the event was stored
    pub time: f64,
    /// Importance score in `[0, 1]`
    pub salience: f32,
}

impl EpisodicEvent {
    pub fn new(content: impl Into<String>, time: f64, salience: f32) -> Self {
        Self {
            content: content.into(),
            time,
            salience: salience.clamp(0.0, 1.0),
        }
    }
}
