//! Conversational agent orchestrating the three memory tiers
//!
//! Every observed user turn lands in working memory and the episodic log.
//! Replies are grounded in facts retrieved from semantic memory, and
//! [`Agent::sleep`] distills salient episodes into new facts.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm::{LanguageModel, build_reply_prompt};
use crate::memory::{
    EpisodicStore, Role, SemanticStore, WorkingState, apply, consolidate, estimate_salience,
};
use crate::search::{SearchProvider, format_search_results, should_search};
use crate::storage::Snapshot;

/// Summary of one consolidation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SleepReport {
    /// Episodic events at or above the sleep threshold
    pub sampled: usize,
    /// Abstractions produced and added to semantic memory
    pub abstractions: Vec<String>,
    /// Facts removed by retraction before the new ones were added
    pub retracted: usize,
    /// Semantic memory size after the pass
    pub total_facts: usize,
}

/// A single conversational agent with working, episodic and semantic memory
pub struct Agent {
    config: Config,
    working: WorkingState,
    episodic: EpisodicStore,
    semantic: SemanticStore,
    llm: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl Agent {
    /// Create an agent with empty memory.
    ///
    /// `search` is consulted only when `config.search.enabled` is set.
    pub fn new(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        info!(
            "Agent initialized with llm: {}, embedder: {}, search: {}",
            llm.name(),
            embedder.name(),
            search.as_ref().map(|s| s.name()).unwrap_or("none")
        );

        Self {
            working: WorkingState::new(config.memory.working_turns),
            episodic: EpisodicStore::new(),
            semantic: SemanticStore::with_cache_capacity(config.embedding.cache_capacity),
            config,
            llm,
            embedder,
            search,
        }
    }

    /// Record a user turn and return its salience
    pub fn observe(&mut self, text: &str) -> f32 {
        let salience = estimate_salience(text);
        self.working.add(Role::User, text);
        self.episodic.store(text, salience);
        debug!("Observed turn with salience {:.2}", salience);
        salience
    }

    /// Produce a reply to the latest user turn.
    ///
    /// Collaborator failures never escape: retrieval and search degrade to
    /// nothing, and a failed generation becomes a bracketed notice.
    pub async fn respond(&mut self) -> String {
        let query = self.working.last_user_message().map(str::to_string);

        let (facts, search_block) = match query.as_deref() {
            Some(query) => {
                let facts = self
                    .semantic
                    .retrieve_relevant(query, self.config.memory.max_facts, self.embedder.as_ref())
                    .await;
                let search_block = self.web_context(query).await;
                (facts, search_block)
            }
            None => (Vec::new(), String::new()),
        };
        debug!("Responding with {} facts", facts.len());

        let prompt = build_reply_prompt(&facts, &search_block, &self.working.to_transcript());
        let reply = match self.llm.generate(&prompt).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                warn!("Language model {} failed: {}", self.llm.name(), e);
                format!("[language model unavailable: {e}]")
            }
        };

        self.working.add(Role::Assistant, reply.clone());
        reply
    }

    async fn web_context(&self, query: &str) -> String {
        if !self.config.search.enabled || !should_search(query) {
            return String::new();
        }
        let Some(search) = &self.search else {
            return String::new();
        };

        match search.search(query, self.config.search.max_results).await {
            Ok(results) => format_search_results(query, &results),
            Err(e) => {
                warn!("Search provider {} failed: {}", search.name(), e);
                String::new()
            }
        }
    }

    /// Consolidate salient episodes into semantic memory
    pub fn sleep(&mut self) -> SleepReport {
        let sampled = self
            .episodic
            .sample_for_sleep(self.config.memory.sleep_threshold);
        let abstractions = consolidate(&sampled);
        let outcome = apply(&abstractions, &mut self.semantic);

        let report = SleepReport {
            sampled: sampled.len(),
            abstractions,
            retracted: outcome.retracted,
            total_facts: self.semantic.len(),
        };
        info!(
            "Sleep consolidated {} events into {} abstractions ({} retracted, {} facts total)",
            report.sampled,
            report.abstractions.len(),
            report.retracted,
            report.total_facts
        );
        report
    }

    /// Capture the full memory state for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            semantic_memory: self.semantic.all(),
            episodic_memory: self.episodic.events().to_vec(),
            working_memory: self.working.context(),
        }
    }

    /// Replace semantic and episodic memory with a snapshot's contents.
    ///
    /// Working memory always starts empty, whatever the snapshot holds.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.semantic =
            SemanticStore::from_facts(snapshot.semantic_memory, self.config.embedding.cache_capacity);
        self.episodic = EpisodicStore::from_events(snapshot.episodic_memory);
        self.working.clear();
        info!(
            "Restored {} facts and {} events",
            self.semantic.len(),
            self.episodic.len()
        );
    }

    /// Ranked facts for an arbitrary query, without touching the conversation
    pub async fn recall(&mut self, query: &str, max_facts: Option<usize>) -> Vec<String> {
        self.semantic
            .retrieve_relevant(query, max_facts, self.embedder.as_ref())
            .await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn working(&self) -> &WorkingState {
        &self.working
    }

    pub fn episodic(&self) -> &EpisodicStore {
        &self.episodic
    }

    pub fn semantic(&self) -> &SemanticStore {
        &self.semantic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::EpisodicEvent;
    use crate::search::SearchResult;
    use crate::testing::{
        FailingEmbedder, FailingLanguageModel, MockEmbedder, MockLanguageModel, MockSearch,
    };

    fn agent_with(llm: Arc<dyn LanguageModel>, embedder: Arc<dyn Embedder>) -> Agent {
        let mut config = Config::default();
        config.search.enabled = false;
        Agent::new(config, llm, embedder, None)
    }

    fn mock_agent() -> Agent {
        agent_with(
            Arc::new(MockLanguageModel::new("ok")),
            Arc::new(MockEmbedder::new()),
        )
    }

    #[test]
    fn test_observe_records_turn_and_event() {
        let mut agent = mock_agent();
        let salience = agent.observe("My name is Ada");

        assert_eq!(agent.working().len(), 1);
        assert_eq!(agent.episodic().len(), 1);
        assert_eq!(agent.episodic().events()[0].salience, salience);
        assert_eq!(agent.working().last_user_message(), Some("My name is Ada"));
    }

    #[tokio::test]
    async fn test_respond_adds_assistant_turn() {
        let llm = Arc::new(MockLanguageModel::new("  Hello Ada!  "));
        let mut agent = agent_with(llm.clone(), Arc::new(MockEmbedder::new()));

        agent.observe("hi there");
        let reply = agent.respond().await;

        assert_eq!(reply, "Hello Ada!");
        let turns = agent.working().context();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, Role::Assistant);
        assert!(llm.prompts()[0].contains("user: hi there"));
    }

    #[tokio::test]
    async fn test_respond_includes_retrieved_facts() {
        let embedder = MockEmbedder::new()
            .with_vector("what do I drink?", vec![1.0, 0.0])
            .with_vector("User preference: I always prefer tea!", vec![1.0, 0.1]);
        let llm = Arc::new(MockLanguageModel::new("Tea."));
        let mut agent = agent_with(llm.clone(), Arc::new(embedder));

        agent.observe("I always prefer tea!");
        assert_eq!(agent.sleep().total_facts, 1);
        agent.observe("what do I drink?");
        agent.respond().await;

        assert!(llm.prompts()[0].contains("- User preference: I always prefer tea!"));
    }

    #[tokio::test]
    async fn test_respond_without_user_message() {
        let llm = Arc::new(MockLanguageModel::new("Hello?"));
        let mut agent = agent_with(llm.clone(), Arc::new(FailingEmbedder));

        assert_eq!(agent.respond().await, "Hello?");
        assert!(llm.prompts()[0].contains("(nothing yet)"));
    }

    #[tokio::test]
    async fn test_respond_llm_failure_becomes_notice() {
        let mut agent = agent_with(Arc::new(FailingLanguageModel), Arc::new(MockEmbedder::new()));
        agent.observe("hello");

        let reply = agent.respond().await;
        assert!(reply.starts_with("[language model unavailable: "));
        assert!(reply.contains("timed out"));
        assert_eq!(agent.working().len(), 2);
    }

    #[tokio::test]
    async fn test_respond_embedder_failure_still_replies() {
        let mut agent = agent_with(Arc::new(MockLanguageModel::new("fine")), Arc::new(FailingEmbedder));
        agent.observe("I always prefer coffee!");
        agent.sleep();
        agent.observe("what do I like?");

        assert_eq!(agent.respond().await, "fine");
    }

    #[tokio::test]
    async fn test_search_used_when_enabled_and_triggered() {
        let search = Arc::new(MockSearch::new(vec![SearchResult {
            title: "Lima".into(),
            snippet: "Capital of Peru.".into(),
            url: String::new(),
        }]));
        let llm = Arc::new(MockLanguageModel::new("Lima"));
        let mut agent = Agent::new(
            Config::default(),
            llm.clone(),
            Arc::new(MockEmbedder::new()),
            Some(search.clone()),
        );

        agent.observe("What is the capital of Peru?");
        agent.respond().await;
        agent.observe("I prefer tea");
        agent.respond().await;

        assert_eq!(search.calls(), 1);
        assert!(llm.prompts()[0].contains("Capital of Peru."));
        assert!(!llm.prompts()[1].contains("SEARCH RESULTS"));
    }

    #[tokio::test]
    async fn test_search_failure_is_absorbed() {
        let mut agent = Agent::new(
            Config::default(),
            Arc::new(MockLanguageModel::new("still here")),
            Arc::new(MockEmbedder::new()),
            Some(Arc::new(MockSearch::failing())),
        );

        agent.observe("what is the latest news?");
        assert_eq!(agent.respond().await, "still here");
    }

    #[test]
    fn test_sleep_report() {
        let mut agent = mock_agent();
        agent.observe("My name is Ada!");
        agent.observe("ok");
        agent.observe("I always prefer tea!");

        let report = agent.sleep();
        assert_eq!(report.sampled, 2);
        assert_eq!(
            report.abstractions,
            vec!["User stated: My name is Ada!", "User preference: I always prefer tea!"]
        );
        assert_eq!(report.retracted, 0);
        assert_eq!(report.total_facts, 2);
    }

    #[test]
    fn test_repeated_sleep_is_idempotent() {
        let mut agent = mock_agent();
        agent.observe("My name is Ada!");
        agent.sleep();

        let report = agent.sleep();
        assert_eq!(report.retracted, 1);
        assert_eq!(report.total_facts, 1);
        assert_eq!(agent.semantic().facts(), ["User stated: My name is Ada!"]);
    }

    #[test]
    fn test_restore_resets_working_memory() {
        let mut agent = mock_agent();
        agent.observe("leftover turn");

        agent.restore(Snapshot {
            semantic_memory: vec!["User fact: I live in Lima".into()],
            episodic_memory: vec![EpisodicEvent::new("I live in Lima", 1_700_000_000.0, 0.3)],
            working_memory: vec![],
        });

        assert!(agent.working().is_empty());
        assert_eq!(agent.semantic().len(), 1);
        assert_eq!(agent.episodic().len(), 1);
    }

    #[test]
    fn test_snapshot_captures_all_tiers() {
        let mut agent = mock_agent();
        agent.observe("My name is Ada!");
        agent.sleep();

        let snapshot = agent.snapshot();
        assert_eq!(snapshot.semantic_memory, vec!["User stated: My name is Ada!"]);
        assert_eq!(snapshot.episodic_memory.len(), 1);
        assert_eq!(snapshot.working_memory.len(), 1);
    }
}
