//! Snapshot persistence
//!
//! Whole-state save and load of semantic and episodic memory.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotStore};
