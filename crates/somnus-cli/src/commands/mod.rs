pub mod chat;
pub mod memory;
pub mod recall;
pub mod sleep;
pub mod stats;

use std::sync::Arc;

use somnus::Agent;
use somnus::config::Config;
use somnus::embedding::HttpEmbedder;
use somnus::llm::ChatClient;
use somnus::search::{DuckDuckGoSearch, SearchProvider};

use crate::error::CliResult;

pub use chat::ChatCommand;
pub use memory::MemoryCommand;
pub use recall::RecallCommand;
pub use sleep::SleepCommand;
pub use stats::StatsCommand;

/// Build an agent wired to the HTTP collaborators named in `config`.
///
/// No network traffic happens here; clients connect lazily.
pub fn build_agent(config: &Config) -> CliResult<Agent> {
    let llm = ChatClient::new(&config.llm)?;
    let embedder = HttpEmbedder::new(&config.embedding)?;
    let search: Option<Arc<dyn SearchProvider>> = if config.search.enabled {
        Some(Arc::new(DuckDuckGoSearch::new(&config.search)?))
    } else {
        None
    };

    Ok(Agent::new(
        config.clone(),
        Arc::new(llm),
        Arc::new(embedder),
        search,
    ))
}
