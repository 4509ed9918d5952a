use clap::Parser;
use somnus::SleepReport;
use somnus::config::Config;
use somnus::storage::SnapshotStore;

use crate::commands::build_agent;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct SleepCommand {}

impl SleepCommand {
    pub async fn execute(
        &self,
        config: &Config,
        store: &SnapshotStore,
        format: OutputFormat,
    ) -> CliResult<()> {
        let mut agent = build_agent(config)?;
        agent.restore(store.load()?);

        let report = agent.sleep();
        store.save(&agent.snapshot())?;

        print_report(&report, format)
    }
}

pub(crate) fn print_report(report: &SleepReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            println!(
                "Consolidated {} salient events into {} facts ({} retracted).",
                report.sampled,
                report.abstractions.len(),
                report.retracted
            );
            for abstraction in &report.abstractions {
                println!("  + {abstraction}");
            }
            println!("Semantic memory now holds {} facts.", report.total_facts);
        }
    }
    Ok(())
}
