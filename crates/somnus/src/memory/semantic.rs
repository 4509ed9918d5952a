//! Semantic memory
//!
//! Holds the consolidated facts the agent knows about its user and ranks
//! them against a query by embedding similarity.
//!
//! Retrieval runs in stages:
//! 1. Embed the query. If that fails nothing is returned.
//! 2. Embed every fact, reusing cached vectors. Facts that fail are skipped.
//! 3. Rank by cosine similarity, highest first, ties in insertion order.
//! 4. Keep facts scoring above [`RELEVANCE_THRESHOLD`]; if none do, fall back
//!    to the best-ranked facts so retrieval never starves.
//!
//! The embedding cache is cleared whenever a fact is added. Every retrieval
//! after a write re-embeds the whole store, which is acceptable for the small
//! fact sets an agent accumulates.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::{debug, warn};

use crate::embedding::{Embedder, cosine_similarity};

/// Similarity a fact must exceed to count as relevant
pub const RELEVANCE_THRESHOLD: f32 = 0.5;

/// Default capacity of the embedding cache
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// A fact returned by retrieval with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFact {
    pub fact: String,
    pub similarity: f32,
}

/// Embedding vectors keyed by the exact text they were computed from
#[derive(Debug)]
pub struct EmbeddingCache {
    entries: LruCache<String, Vec<f32>>,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` vectors (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    pub fn get(&mut self, text: &str) -> Option<&Vec<f32>> {
        self.entries.get(text)
    }

    pub fn insert(&mut self, text: &str, embedding: Vec<f32>) {
        self.entries.put(text.to_string(), embedding);
    }

    /// Drop every cached vector
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Ordered collection of consolidated facts plus their embedding cache
#[derive(Debug, Default)]
pub struct SemanticStore {
    facts: Vec<String>,
    cache: EmbeddingCache,
}

impl SemanticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            facts: Vec::new(),
            cache: EmbeddingCache::new(capacity),
        }
    }

    /// Rebuild a store from previously persisted facts
    pub fn from_facts(facts: Vec<String>, cache_capacity: usize) -> Self {
        Self {
            facts,
            cache: EmbeddingCache::new(cache_capacity),
        }
    }

    /// Append a fact and invalidate the embedding cache
    pub fn add(&mut self, fact: impl Into<String>) {
        self.facts.push(fact.into());
        self.cache.clear();
    }

    /// Remove every fact matching `predicate`, returning how many were removed
    pub fn retract<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.facts.len();
        self.facts.retain(|fact| !predicate(fact));
        before - self.facts.len()
    }

    /// Independent copy of every fact, in insertion order
    pub fn all(&self) -> Vec<String> {
        self.facts.clone()
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Facts relevant to `query`, best first.
    ///
    /// `max_facts` of `None` means unbounded.
    pub async fn retrieve_relevant(
        &mut self,
        query: &str,
        max_facts: Option<usize>,
        embedder: &dyn Embedder,
    ) -> Vec<String> {
        self.retrieve_scored(query, max_facts, embedder)
            .await
            .into_iter()
            .map(|s| s.fact)
            .collect()
    }

    /// Same as [`retrieve_relevant`](Self::retrieve_relevant) but keeps the
    /// similarity of each returned fact.
    pub async fn retrieve_scored(
        &mut self,
        query: &str,
        max_facts: Option<usize>,
        embedder: &dyn Embedder,
    ) -> Vec<ScoredFact> {
        if self.facts.is_empty() {
            return Vec::new();
        }

        let Some(query_embedding) = self.embedding_for(query, embedder).await else {
            warn!("Query embedding failed, returning no facts");
            return Vec::new();
        };

        let mut candidates = Vec::with_capacity(self.facts.len());
        for fact in self.facts.clone() {
            match self.embedding_for(&fact, embedder).await {
                Some(embedding) => {
                    let similarity = cosine_similarity(&query_embedding, &embedding);
                    candidates.push(ScoredFact { fact, similarity });
                }
                None => debug!("Skipping fact without embedding: {}", fact),
            }
        }

        // Stable sort keeps insertion order among equal scores
        candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        let limit = max_facts.unwrap_or(usize::MAX);
        let relevant: Vec<ScoredFact> = candidates
            .iter()
            .filter(|c| c.similarity > RELEVANCE_THRESHOLD)
            .take(limit)
            .cloned()
            .collect();

        if relevant.is_empty() && !candidates.is_empty() {
            debug!(
                "No fact above {} similarity, falling back to top candidates",
                RELEVANCE_THRESHOLD
            );
            candidates.truncate(limit);
            return candidates;
        }

        relevant
    }

    async fn embedding_for(&mut self, text: &str, embedder: &dyn Embedder) -> Option<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Some(cached.clone());
        }

        match embedder.embed(text).await {
            Ok(embedding) => {
                self.cache.insert(text, embedding.clone());
                Some(embedding)
            }
            Err(e) => {
                warn!("Embedding via {} failed: {}", embedder.name(), e);
                None
            }
        }
    }
}
