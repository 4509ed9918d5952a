//! Memory tiers and consolidation
//!
//! Working memory holds the live conversation, episodic memory logs every
//! observed turn with its salience, and semantic memory keeps the durable
//! facts produced by sleep consolidation.

pub mod consolidation;
pub mod episodic;
pub mod salience;
pub mod semantic;
pub mod types;
pub mod working;

pub use consolidation::{ApplyOutcome, Category, apply, consolidate};
pub use episodic::{DEFAULT_SLEEP_THRESHOLD, EpisodicStore};
pub use salience::estimate_salience;
pub use semantic::{EmbeddingCache, RELEVANCE_THRESHOLD, ScoredFact, SemanticStore};
pub use types::{EpisodicEvent, Message, Role};
pub use working::{DEFAULT_MAX_TURNS, WorkingState};
