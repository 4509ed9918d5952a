use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use somnus::config::Config;
use somnus::storage::SnapshotStore;

use crate::commands::build_agent;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct RecallCommand {
    #[clap(help = "Text to retrieve facts for")]
    pub query: String,

    #[clap(long, short, help = "Maximum number of facts to return")]
    pub limit: Option<usize>,
}

impl RecallCommand {
    pub async fn execute(
        &self,
        config: &Config,
        store: &SnapshotStore,
        format: OutputFormat,
    ) -> CliResult<()> {
        let mut agent = build_agent(config)?;
        agent.restore(store.load()?);

        let limit = self.limit.or(config.memory.max_facts);
        let facts = agent.recall(&self.query, limit).await;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&facts)?);
            }
            OutputFormat::Table => {
                if facts.is_empty() {
                    println!("No facts recalled.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Rank", "Fact"]);

                for (rank, fact) in facts.iter().enumerate() {
                    table.add_row([(rank + 1).to_string(), fact.clone()]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }
}
