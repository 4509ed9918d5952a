//! Somnus - three-tier memory for a conversational agent
//!
//! Working memory holds the live conversation, an episodic log records every
//! observed turn with its salience, and a periodic "sleep" pass distills the
//! salient episodes into durable semantic facts that ground later replies.

pub mod agent;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod memory;
pub mod search;
pub mod storage;
pub mod testing;

pub use agent::{Agent, SleepReport};
pub use error::{CollaboratorError, SomnusError};
