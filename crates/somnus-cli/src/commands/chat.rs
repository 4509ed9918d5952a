use std::io::Write;

use clap::Parser;
use somnus::Agent;
use somnus::config::Config;
use somnus::storage::SnapshotStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::commands::build_agent;
use crate::commands::sleep::print_report;
use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ChatCommand {}

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to sleep; memory was consolidated before saving
    Slept,
    /// `exit`, `quit` or end of input; memory saved as-is
    Exited,
}

impl ChatCommand {
    pub async fn execute(
        &self,
        config: &Config,
        store: &SnapshotStore,
        format: OutputFormat,
    ) -> CliResult<()> {
        let mut agent = build_agent(config)?;
        agent.restore(store.load()?);

        println!(
            "Somnus ready ({} facts, {} events remembered).",
            agent.semantic().len(),
            agent.episodic().len()
        );
        println!("Type 'sleep' to consolidate and exit, 'exit' to leave.\n");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        let end = run_session(&mut agent, stdin, &mut stdout).await?;

        if end == SessionEnd::Slept {
            let report = agent.sleep();
            print_report(&report, format)?;
        }
        store.save(&agent.snapshot())?;
        println!("Memory saved to {}", store.path().display());

        Ok(())
    }
}

/// Read user lines until `sleep`, `exit`, `quit` or end of input, answering
/// each one.
pub async fn run_session<R, W>(agent: &mut Agent, input: R, out: &mut W) -> CliResult<SessionEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "You: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            return Ok(SessionEnd::Exited);
        };

        let text = line.trim();
        match text.to_lowercase().as_str() {
            "" => continue,
            "sleep" => return Ok(SessionEnd::Slept),
            "exit" | "quit" => return Ok(SessionEnd::Exited),
            _ => {}
        }

        agent.observe(text);
        let reply = agent.respond().await;
        writeln!(out, "Agent: {reply}\n")?;
    }
}
