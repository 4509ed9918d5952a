//! Chat completion client for OpenAI-compatible APIs
//!
//! Implements [`LanguageModel`] over HTTP. Works with any endpoint that
//! speaks the `/chat/completions` protocol (OpenAI, Ollama, vLLM, llama.cpp).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::CollaboratorError;
use crate::llm::LanguageModel;
use crate::llm::prompts::SYSTEM_PROMPT;

const MAX_RETRIES: u32 = 3;

/// Language model reached over an OpenAI-compatible HTTP API
#[derive(Debug)]
pub struct ChatClient {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl ChatClient {
    /// Create a new chat client with the given configuration
    ///
    /// The API key is read from `config.api_key_env` when set; local servers
    /// usually need none.
    pub fn new(config: &LlmConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Config(e.to_string()))?;

        info!(
            "ChatClient initialized with model: {}, api_url: {}",
            config.model, config.api_url
        );

        Ok(Self {
            client,
            config: config.clone(),
            api_key: env::var(&config.api_key_env).ok().filter(|k| !k.is_empty()),
        })
    }

    /// Call the API with exponential backoff
    ///
    /// Retries up to 3 times, waiting 1s, 2s, 4s, on 429 responses and
    /// transport failures. Callers bound the whole loop with a deadline.
    async fn call_api(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );
        debug!("Calling chat API at: {}", url);

        let mut last_error = None;
        let mut delay = Duration::from_secs(1);

        for attempt in 0..MAX_RETRIES {
            let mut builder = self.client.post(&url).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == 429 {
                        warn!(
                            "Rate limited on attempt {}/{}, waiting {:?}",
                            attempt + 1,
                            MAX_RETRIES,
                            delay
                        );
                        last_error = Some("rate limited (429)".to_string());
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                        continue;
                    }

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

                    let completion: ChatCompletionResponse = response
                        .json()
                        .await
                        .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

                    return completion
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or(CollaboratorError::EmptyResponse);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    last_error = Some(err_msg.clone());
                    if attempt < MAX_RETRIES - 1 {
                        warn!(
                            "Request failed on attempt {}/{}, retrying: {}",
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(CollaboratorError::Request(format!(
            "Failed after {} retries: {}",
            MAX_RETRIES,
            last_error.unwrap_or_else(|| "Unknown error".to_string())
        )))
    }
}

#[async_trait]
impl LanguageModel for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        // One deadline covers every attempt and backoff
        let deadline = Duration::from_secs(self.config.timeout_secs);
        let reply = tokio::time::timeout(deadline, self.call_api(prompt))
            .await
            .map_err(|_| {
                CollaboratorError::Request(format!(
                    "timed out after {}s",
                    self.config.timeout_secs
                ))
            })??;
        debug!("Generated reply of {} chars", reply.len());
        Ok(reply)
    }

    fn name(&self) -> &'static str {
        "chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(api_url: String) -> LlmConfig {
        LlmConfig {
            api_url,
            api_key_env: "SOMNUS_TEST_UNSET_CHAT_KEY".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            temperature: 0.2,
            max_tokens: 64,
        }
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "content": content } }]
        })
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "model": "test-model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello Ada!")))
            .mount(&mock_server)
            .await;

        let client = ChatClient::new(&create_test_config(mock_server.uri())).unwrap();
        let reply = client.generate("say hello").await.unwrap();
        assert_eq!(reply, "Hello Ada!");
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_messages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": "the prompt" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ChatClient::new(&create_test_config(mock_server.uri())).unwrap();
        assert_eq!(client.generate("the prompt").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_rate_limit_retry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("after retry")))
            .mount(&mock_server)
            .await;

        let client = ChatClient::new(&create_test_config(mock_server.uri())).unwrap();

        let start = std::time::Instant::now();
        let reply = client.generate("hi").await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(reply, "after retry");
        assert!(elapsed >= Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_retries_bounded_by_overall_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(mock_server.uri());
        config.timeout_secs = 1;
        let client = ChatClient::new(&config).unwrap();

        let start = std::time::Instant::now();
        let err = client.generate("hi").await.unwrap_err();

        assert!(start.elapsed() < Duration::from_secs(3));
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = ChatClient::new(&create_test_config(mock_server.uri())).unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let client = ChatClient::new(&create_test_config(mock_server.uri())).unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_name() {
        let client = ChatClient::new(&create_test_config("http://localhost:1".into())).unwrap();
        assert_eq!(client.name(), "chat");
    }
}
