//! Web search collaborator
//!
//! Decides when a user message needs fresh information from the web and
//! fetches it from the DuckDuckGo instant answer API (no API key required).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::CollaboratorError;

/// Phrases suggesting a message asks for factual or current information
const SEARCH_TRIGGERS: &[&str] = &[
    "what is",
    "who is",
    "when",
    "where",
    "how",
    "latest",
    "current",
    "news",
    "today",
    "2024",
    "2025",
    "2026",
    "weather",
    "stock",
    "how do",
    "why",
    "what's new",
    "tell me about",
    "search for",
];

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Trait for web search backends
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `max_results` hits for `query`, best first
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Whether `query` would benefit from a web search
pub fn should_search(query: &str) -> bool {
    let lower = query.to_lowercase();
    SEARCH_TRIGGERS.iter().any(|t| lower.contains(t))
}

/// Render results as a prompt block; empty string when there are none
pub fn format_search_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut formatted = format!("\n=== SEARCH RESULTS FOR: {query} ===\n");
    for (i, result) in results.iter().enumerate() {
        formatted.push_str(&format!("\n{}. {}\n", i + 1, result.title));
        formatted.push_str(&format!("   {}\n", result.snippet));
        if !result.url.is_empty() {
            formatted.push_str(&format!("   URL: {}\n", result.url));
        }
    }
    formatted.push_str("=== END SEARCH RESULTS ===\n");
    formatted
}

/// DuckDuckGo instant answer client
#[derive(Debug)]
pub struct DuckDuckGoSearch {
    client: Client,
    api_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<serde_json::Value>,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, CollaboratorError> {
        debug!("Searching DuckDuckGo for: {}", query);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        Ok(collect_results(answer, max_results))
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

fn collect_results(answer: InstantAnswer, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() {
            "Summary".to_string()
        } else {
            answer.heading
        };
        results.push(SearchResult {
            title,
            snippet: answer.abstract_text,
            url: answer.abstract_url,
        });
    }

    // Disambiguation groups carry no "Text" and are skipped
    for topic in answer.related_topics.iter().take(max_results) {
        let Some(text) = topic.get("Text").and_then(|t| t.as_str()) else {
            continue;
        };
        let url = topic
            .get("FirstURL")
            .and_then(|u| u.as_str())
            .unwrap_or_default();
        let title = url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("Result");
        results.push(SearchResult {
            title: title.to_string(),
            snippet: text.to_string(),
            url: url.to_string(),
        });
    }

    results.truncate(max_results);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config(api_url: String) -> SearchConfig {
        SearchConfig {
            enabled: true,
            api_url,
            timeout_secs: 5,
            max_results: 3,
        }
    }

    #[test]
    fn test_should_search_triggers() {
        assert!(should_search("What is the capital of Peru?"));
        assert!(should_search("any NEWS on the launch"));
        assert!(should_search("best laptops of 2025"));
        assert!(should_search("Tell me about otters"));
        assert!(!should_search("My name is Ada"));
        assert!(!should_search("I prefer tea"));
    }

    #[test]
    fn test_format_empty_results() {
        assert_eq!(format_search_results("anything", &[]), "");
    }

    #[test]
    fn test_format_results() {
        let results = vec![
            SearchResult {
                title: "Otter".into(),
                snippet: "A semiaquatic mammal.".into(),
                url: "https://example.com/Otter".into(),
            },
            SearchResult {
                title: "Sea otter".into(),
                snippet: "Lives in the Pacific.".into(),
                url: String::new(),
            },
        ];

        let formatted = format_search_results("otters", &results);
        assert_eq!(
            formatted,
            "\n=== SEARCH RESULTS FOR: otters ===\n\
             \n1. Otter\n   A semiaquatic mammal.\n   URL: https://example.com/Otter\n\
             \n2. Sea otter\n   Lives in the Pacific.\n\
             === END SEARCH RESULTS ===\n"
        );
    }

    #[test]
    fn test_collect_results_abstract_then_topics() {
        let answer: InstantAnswer = serde_json::from_value(serde_json::json!({
            "Heading": "Rust",
            "AbstractText": "A systems programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "RelatedTopics": [
                { "Text": "Cargo - the package manager", "FirstURL": "https://duckduckgo.com/Cargo" },
                { "Name": "Group", "Topics": [] },
                { "Text": "Untitled topic", "FirstURL": "" }
            ]
        }))
        .unwrap();

        let results = collect_results(answer, 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust");
        assert_eq!(results[1].title, "Cargo");
        assert_eq!(results[2].title, "Result");
    }

    #[test]
    fn test_collect_results_truncates() {
        let answer: InstantAnswer = serde_json::from_value(serde_json::json!({
            "AbstractText": "Summary text",
            "RelatedTopics": [
                { "Text": "one", "FirstURL": "https://duckduckgo.com/One" },
                { "Text": "two", "FirstURL": "https://duckduckgo.com/Two" }
            ]
        }))
        .unwrap();

        let results = collect_results(answer, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Summary");
        assert_eq!(results[1].snippet, "one");
    }

    #[tokio::test]
    async fn test_duckduckgo_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "rust language"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Heading": "Rust",
                "AbstractText": "A language empowering everyone.",
                "AbstractURL": "https://www.rust-lang.org",
                "RelatedTopics": []
            })))
            .mount(&mock_server)
            .await;

        let search = DuckDuckGoSearch::new(&create_test_config(mock_server.uri())).unwrap();
        let results = search.search("rust language", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://www.rust-lang.org");
    }

    #[tokio::test]
    async fn test_duckduckgo_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let search = DuckDuckGoSearch::new(&create_test_config(mock_server.uri())).unwrap();
        let err = search.search("anything", 3).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
