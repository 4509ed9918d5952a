//! Embedding collaborator
//!
//! Defines the [`Embedder`] trait used by semantic retrieval and an
//! OpenAI-compatible HTTP implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::error::CollaboratorError;

/// Turns text into a dense vector.
///
/// The same embedder is used for queries and stored facts so their vectors
/// are comparable.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint
/// (OpenAI, Ollama, llama.cpp server, ...).
#[derive(Debug)]
pub struct HttpEmbedder {
    client: Client,
    config: EmbeddingConfig,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create a client from configuration.
    ///
    /// The API key is read from `config.api_key_env` if that variable is set.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Config(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key: env::var(&config.api_key_env).ok().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let url = format!("{}/embeddings", self.config.api_url.trim_end_matches('/'));
        debug!("Requesting embedding from: {}", url);

        let mut request = self.client.post(&url).json(&EmbeddingRequest {
            model: &self.config.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(CollaboratorError::EmptyResponse)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` for empty, mismatched or zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
