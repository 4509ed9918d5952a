//! Language model provider trait
//!
//! Abstracts the service that turns a prompt into a natural-language reply
//! so the agent can be driven by a real API or a test double.

use async_trait::async_trait;

use crate::error::CollaboratorError;

/// Trait for reply generators (remote chat API, local server, fakes)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a reply for a fully rendered prompt
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
