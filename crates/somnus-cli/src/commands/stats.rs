use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use somnus::config::Config;
use somnus::memory::Category;
use somnus::storage::{Snapshot, SnapshotStore};

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct StatsCommand {}

/// Counts derived from a snapshot
#[derive(Debug, PartialEq, Serialize)]
struct MemoryStats {
    facts: usize,
    facts_by_category: Vec<CategoryCount>,
    events: usize,
    salient_events: usize,
    sleep_threshold: f32,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct CategoryCount {
    category: String,
    count: usize,
}

impl MemoryStats {
    fn from_snapshot(snapshot: &Snapshot, sleep_threshold: f32) -> Self {
        let facts_by_category = Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category: format!("{category:?}").to_lowercase(),
                count: snapshot
                    .semantic_memory
                    .iter()
                    .filter(|f| Category::from_label(f) == Some(category))
                    .count(),
            })
            .collect();

        Self {
            facts: snapshot.semantic_memory.len(),
            facts_by_category,
            events: snapshot.episodic_memory.len(),
            salient_events: snapshot
                .episodic_memory
                .iter()
                .filter(|e| e.salience >= sleep_threshold)
                .count(),
            sleep_threshold,
        }
    }
}

impl StatsCommand {
    pub fn execute(
        &self,
        config: &Config,
        store: &SnapshotStore,
        format: OutputFormat,
    ) -> CliResult<()> {
        let threshold = config.memory.sleep_threshold;
        let stats = MemoryStats::from_snapshot(&store.load()?, threshold);

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            OutputFormat::Table => {
                println!("Somnus Statistics");
                println!("=================\n");
                println!("Snapshot: {}\n", store.path().display());

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Memory", "Count"]);

                table.add_row(["Semantic facts".to_string(), stats.facts.to_string()]);
                for entry in &stats.facts_by_category {
                    table.add_row([format!("  {}", entry.category), entry.count.to_string()]);
                }
                table.add_row(["Episodic events".to_string(), stats.events.to_string()]);
                table.add_row([
                    format!("  salience >= {threshold:.2}"),
                    stats.salient_events.to_string(),
                ]);

                println!("{table}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use somnus::memory::EpisodicEvent;

    #[test]
    fn test_stats_from_snapshot() {
        let snapshot = Snapshot {
            semantic_memory: vec![
                "User stated: My name is Ada!".into(),
                "User preference: I always prefer tea!".into(),
                "User preference: I love jazz!".into(),
            ],
            episodic_memory: vec![
                EpisodicEvent::new("ok", 1.0, 0.1),
                EpisodicEvent::new("My name is Ada!", 2.0, 0.55),
                EpisodicEvent::new("exactly", 3.0, 0.5),
            ],
            working_memory: vec![],
        };

        let stats = MemoryStats::from_snapshot(&snapshot, 0.5);
        assert_eq!(stats.facts, 3);
        assert_eq!(stats.events, 3);
        assert_eq!(stats.salient_events, 2);
        assert_eq!(
            stats.facts_by_category[0],
            CategoryCount {
                category: "identity".into(),
                count: 1
            }
        );
        assert_eq!(stats.facts_by_category[2].count, 2);
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = MemoryStats::from_snapshot(&Snapshot::default(), 0.5);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["facts"], 0);
        assert_eq!(json["sleep_threshold"], 0.5);
        assert_eq!(json["facts_by_category"][4]["category"], "general");
    }
}
