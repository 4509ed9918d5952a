pub mod commands;
pub mod error;
pub mod output;

pub use commands::{
    ChatCommand, MemoryCommand, RecallCommand, SleepCommand, StatsCommand, build_agent,
};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_timestamp, truncate_string};
