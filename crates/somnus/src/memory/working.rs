//! Working memory
//!
//! A fixed-size FIFO buffer of the most recent conversation turns. It lives
//! for a single session only and is never restored from a snapshot.

use std::collections::VecDeque;

use crate::memory::types::{Message, Role};

/// Default number of turns held in working memory
pub const DEFAULT_MAX_TURNS: usize = 8;

/// Bounded recency buffer of conversation turns
///
/// Evicts the oldest turn whenever a push takes the buffer past `max_turns`.
#[derive(Debug, Clone)]
pub struct WorkingState {
    turns: VecDeque<Message>,
    max_turns: usize,
}

impl WorkingState {
    /// Create an empty buffer holding at most `max_turns` turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns.saturating_add(1)),
            max_turns,
        }
    }

    /// Append a turn, evicting the oldest if the buffer is over capacity
    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push_back(Message::new(role, content));
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Independent copy of the buffered turns, oldest first
    pub fn context(&self) -> Vec<Message> {
        self.turns.iter().cloned().collect()
    }

    /// Most recent user turn, if any
    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Format turns as a transcript for prompt construction
    pub fn to_transcript(&self) -> String {
        self.turns
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }
}

impl Default for WorkingState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}
