//! Sleep consolidation
//!
//! Turns salient episodic events into durable semantic facts. Each event is
//! classified into one [`Category`]; within most categories only the newest
//! event survives (last write wins), while memory requests keep every quoted
//! phrase. [`apply`] merges a batch into the semantic store, retracting the
//! facts the batch supersedes.

use tracing::debug;

use crate::memory::semantic::SemanticStore;
use crate::memory::types::EpisodicEvent;

/// Kind of knowledge an event carries.
///
/// Declaration order is classification precedence: the first category whose
/// keywords appear in an event wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Identity,
    Memory,
    Preference,
    Behavior,
    General,
}

impl Category {
    /// Categories in classification order
    pub const ALL: [Category; 5] = [
        Category::Identity,
        Category::Memory,
        Category::Preference,
        Category::Behavior,
        Category::General,
    ];

    /// Classify `text` (case-insensitively) into exactly one category
    pub fn classify(text: &str) -> Category {
        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.keywords().iter().any(|k| lower.contains(k)))
            .unwrap_or(Category::General)
    }

    /// Substrings that place an event in this category
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Identity => &["name", "call", "i am"],
            Category::Memory => &["remember", "passphrase", "phrase", "password", "secret"],
            Category::Preference => &["fav", "favorite", "prefer", "like", "dislike", "love", "hate"],
            Category::Behavior => &["always", "never", "usually", "rarely", "sometimes"],
            Category::General => &[],
        }
    }

    /// Leading label of every fact produced for this category
    pub fn label(&self) -> &'static str {
        match self {
            Category::Identity => "User stated: ",
            Category::Memory => "User asked to remember: ",
            Category::Preference => "User preference: ",
            Category::Behavior => "User behavior/habit: ",
            Category::General => "User fact: ",
        }
    }

    /// Substrings marking an existing fact as superseded when this category
    /// receives a new abstraction
    pub fn retraction_keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Identity => &["stated:", "name", "i am"],
            Category::Memory => &["remember", "passphrase", "phrase"],
            Category::Preference => &["preference:", "favorite", "like", "dislike"],
            Category::Behavior => &["behavior/habit:", "always", "never", "usually"],
            Category::General => &["fact:"],
        }
    }

    /// Recover the category of a fact from its leading label
    pub fn from_label(fact: &str) -> Option<Category> {
        Self::ALL
            .into_iter()
            .find(|c| fact.starts_with(c.label()))
    }

    /// Whether `fact` is superseded by a new abstraction in this category
    pub fn retracts(&self, fact: &str) -> bool {
        let lower = fact.to_lowercase();
        self.retraction_keywords().iter().any(|k| lower.contains(k))
    }
}

/// Outcome of merging a batch of abstractions into the semantic store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Facts removed because a new abstraction superseded them
    pub retracted: usize,
    /// Abstractions appended
    pub added: usize,
}

/// Convert episodic events into labelled semantic abstractions.
///
/// Categories are emitted in order of first appearance in `events`.
pub fn consolidate(events: &[EpisodicEvent]) -> Vec<String> {
    let mut groups: Vec<(Category, Vec<&EpisodicEvent>)> = Vec::new();
    for event in events {
        let category = Category::classify(&event.content);
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, members)) => members.push(event),
            None => groups.push((category, vec![event])),
        }
    }

    let mut abstractions = Vec::new();
    for (category, members) in groups {
        match category {
            Category::Memory => {
                abstractions.extend(
                    members
                        .iter()
                        .filter_map(|e| quoted_phrase(&e.content))
                        .map(|phrase| format!("{}{}", category.label(), phrase)),
                );
            }
            _ => {
                if let Some(latest) = most_recent(&members) {
                    abstractions.push(format!("{}{}", category.label(), latest.content));
                }
            }
        }
    }

    debug!(
        "Consolidated {} events into {} abstractions",
        events.len(),
        abstractions.len()
    );
    abstractions
}

/// Merge `abstractions` into `store`.
///
/// Every category touched by the batch first retracts the stored facts
/// matching its retraction keywords; then all abstractions are appended.
/// Abstractions without a recognised label retract nothing.
pub fn apply(abstractions: &[String], store: &mut SemanticStore) -> ApplyOutcome {
    let mut updated: Vec<Category> = Vec::new();
    for abstraction in abstractions {
        match Category::from_label(abstraction) {
            Some(category) if !updated.contains(&category) => updated.push(category),
            _ => {}
        }
    }

    let mut retracted = 0;
    for category in &updated {
        let removed = store.retract(|fact| category.retracts(fact));
        if removed > 0 {
            debug!("Retracted {} superseded {:?} facts", removed, category);
        }
        retracted += removed;
    }

    for abstraction in abstractions {
        store.add(abstraction.clone());
    }

    ApplyOutcome {
        retracted,
        added: abstractions.len(),
    }
}

/// Text from the first to the last double quote, inclusive
fn quoted_phrase(content: &str) -> Option<&str> {
    let start = content.find('"')?;
    let end = content.rfind('"')?;
    (end > start).then(|| &content[start..=end])
}

/// Event with the greatest timestamp; later input position wins ties
fn most_recent<'a>(events: &[&'a EpisodicEvent]) -> Option<&'a EpisodicEvent> {
    events
        .iter()
        .copied()
        .max_by(|a, b| a.time.total_cmp(&b.time))
}
