//! Episodic memory
//!
//! Append-only, timestamped log of everything the agent observed. Events are
//! never mutated or removed; sleep selects from them by salience.

use chrono::Utc;

use crate::memory::types::EpisodicEvent;

/// Default salience threshold for sleep sampling
pub const DEFAULT_SLEEP_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct EpisodicStore {
    events: Vec<EpisodicEvent>,
}

impl EpisodicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted events
    pub fn from_events(events: Vec<EpisodicEvent>) -> Self {
        Self { events }
    }

    /// Append an event stamped with the current time.
    ///
    /// Timestamps never go backwards within a store, even if the wall clock
    /// does.
    pub fn store(&mut self, content: impl Into<String>, salience: f32) -> &EpisodicEvent {
        let now = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        let time = match self.events.last() {
            Some(last) if last.time > now => last.time,
            _ => now,
        };
        self.events.push(EpisodicEvent::new(content, time, salience));
        &self.events[self.events.len() - 1]
    }

    /// All events with salience at or above `threshold`, in insertion order
    pub fn sample_for_sleep(&self, threshold: f32) -> Vec<EpisodicEvent> {
        self.events
            .iter()
            .filter(|e| e.salience >= threshold)
            .cloned()
            .collect()
    }

    pub fn events(&self) -> &[EpisodicEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_appends_with_salience() {
        let mut store = EpisodicStore::new();
        let event = store.store("hello", 0.3).clone();
        assert_eq!(event.content, "hello");
        assert_eq!(event.salience, 0.3);
        assert!(event.time > 0.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut store = EpisodicStore::new();
        for i in 0..50 {
            store.store(format!("event {i}"), 0.2);
        }
        let times: Vec<f64> = store.events().iter().map(|e| e.time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_timestamps_follow_restored_future_events() {
        let future = Utc::now().timestamp() as f64 + 10_000.0;
        let mut store = EpisodicStore::from_events(vec![EpisodicEvent::new("later", future, 0.5)]);
        let event = store.store("now", 0.5).clone();
        assert!(event.time >= future);
    }

    #[test]
    fn test_sample_for_sleep_filters_inclusively_in_order() {
        let mut store = EpisodicStore::new();
        store.store("a", 0.9);
        store.store("b", 0.1);
        store.store("c", 0.5);
        store.store("d", 0.49);

        let sampled: Vec<_> = store
            .sample_for_sleep(DEFAULT_SLEEP_THRESHOLD)
            .into_iter()
            .map(|e| e.content)
            .collect();
        assert_eq!(sampled, vec!["a", "c"]);
    }

    #[test]
    fn test_sample_for_sleep_does_not_consume() {
        let mut store = EpisodicStore::new();
        store.store("keep me", 0.8);

        assert_eq!(store.sample_for_sleep(0.5).len(), 1);
        assert_eq!(store.sample_for_sleep(0.5).len(), 1);
        assert_eq!(store.len(), 1);
    }
}
