//! Language model collaborator
//!
//! Produces natural-language replies from prompts assembled by the agent.

pub mod chat;
pub mod prompts;
pub mod provider;

pub use chat::ChatClient;
pub use prompts::build_reply_prompt;
pub use provider::LanguageModel;
