use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use somnus::memory::{Category, EpisodicEvent};
use somnus::storage::{Snapshot, SnapshotStore};

use crate::error::CliResult;
use crate::output::{OutputFormat, format_timestamp, truncate_string};

#[derive(Parser)]
pub struct MemoryCommand {
    #[clap(subcommand)]
    pub command: MemorySubcommand,
}

#[derive(Subcommand)]
pub enum MemorySubcommand {
    #[clap(about = "List consolidated semantic facts")]
    Facts,

    #[clap(about = "List episodic events, newest first")]
    Events(EventsArgs),
}

#[derive(Parser)]
pub struct EventsArgs {
    #[clap(
        long,
        short,
        default_value = "20",
        help = "Maximum number of events to display"
    )]
    pub limit: usize,
}

impl MemoryCommand {
    pub fn execute(&self, store: &SnapshotStore, format: OutputFormat) -> CliResult<()> {
        let snapshot = store.load()?;
        match &self.command {
            MemorySubcommand::Facts => Self::facts(&snapshot, format),
            MemorySubcommand::Events(args) => Self::events(&snapshot, args, format),
        }
    }

    fn facts(snapshot: &Snapshot, format: OutputFormat) -> CliResult<()> {
        let facts = &snapshot.semantic_memory;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(facts)?);
            }
            OutputFormat::Table => {
                if facts.is_empty() {
                    println!("No facts yet. Chat for a while, then run `somnus-cli sleep`.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["#", "Category", "Fact"]);

                for (i, fact) in facts.iter().enumerate() {
                    let category = Category::from_label(fact)
                        .map(|c| format!("{c:?}"))
                        .unwrap_or_else(|| "-".to_string());
                    table.add_row([(i + 1).to_string(), category, fact.clone()]);
                }

                println!("{table}");
                println!("\nTotal: {} facts", facts.len());
            }
        }

        Ok(())
    }

    fn events(snapshot: &Snapshot, args: &EventsArgs, format: OutputFormat) -> CliResult<()> {
        let events: Vec<&EpisodicEvent> = snapshot
            .episodic_memory
            .iter()
            .rev()
            .take(args.limit)
            .collect();

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&events)?);
            }
            OutputFormat::Table => {
                if events.is_empty() {
                    println!("No events recorded.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Time", "Salience", "Content"]);

                for event in &events {
                    table.add_row([
                        format_timestamp(event.time),
                        format!("{:.2}", event.salience),
                        truncate_string(&event.content, 60),
                    ]);
                }

                println!("{table}");
                println!(
                    "\nShowing {} of {} events",
                    events.len(),
                    snapshot.episodic_memory.len()
                );
            }
        }

        Ok(())
    }
}
