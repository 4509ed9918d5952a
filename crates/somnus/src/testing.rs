//! Test utilities for somnus - deterministic collaborator fakes
//!
//! Lets the agent and its memory tiers run in tests without any network
//! access.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::Embedder;
use crate::error::CollaboratorError;
use crate::llm::LanguageModel;
use crate::search::{SearchProvider, SearchResult};

/// Dimensions of vectors produced for unscripted text
pub const MOCK_EMBEDDING_DIMENSION: usize = 64;

/// Mock embedder for fast unit tests that don't need a real model.
///
/// Scripted texts return their configured vector; any other text gets a
/// deterministic vector derived from its hash.
#[derive(Debug, Default)]
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `vector` whenever `text` is embedded
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Fail whenever `text` is embedded
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Number of `embed` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generate a deterministic "embedding" from text using hashing.
    /// Returns values in range [-1, 1].
    pub fn hashed(text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        (0..MOCK_EMBEDDING_DIMENSION)
            .map(|i| {
                let x = seed
                    .wrapping_mul(i as u64 + 1)
                    .wrapping_add(0x9e3779b97f4a7c15);
                let normalized = (x as f32) / (u64::MAX as f32);
                (normalized * 2.0) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(text) {
            return Err(CollaboratorError::Request(format!("mock failure for {text}")));
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| Self::hashed(text)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Embedder that is always unreachable
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CollaboratorError> {
        Err(CollaboratorError::Request("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Language model that answers with a fixed reply and records every prompt
#[derive(Debug)]
pub struct MockLanguageModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockLanguageModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Language model that always times out
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingLanguageModel;

#[async_trait]
impl LanguageModel for FailingLanguageModel {
    async fn generate(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Request("operation timed out".into()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Search backend returning canned results, or failing when built with
/// [`MockSearch::failing`]
#[derive(Debug, Default)]
pub struct MockSearch {
    results: Vec<SearchResult>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CollaboratorError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
