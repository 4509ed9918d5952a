use std::path::PathBuf;

use clap::{Parser, Subcommand};
use somnus::config::Config;
use somnus::storage::SnapshotStore;
use somnus_cli::commands::{
    ChatCommand, MemoryCommand, RecallCommand, SleepCommand, StatsCommand,
};
use somnus_cli::error::CliResult;
use somnus_cli::output::OutputFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "somnus-cli")]
#[command(about = "Somnus - a conversational agent that remembers by sleeping")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(
        long,
        short = 's',
        global = true,
        help = "Path to the memory snapshot (overrides config)"
    )]
    pub snapshot: Option<PathBuf>,

    #[clap(long, short, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Chat interactively with the agent")]
    Chat(ChatCommand),

    #[clap(about = "Consolidate salient episodes into semantic facts")]
    Sleep(SleepCommand),

    #[clap(about = "Inspect stored memory")]
    Memory(MemoryCommand),

    #[clap(about = "Retrieve the facts most relevant to a query")]
    Recall(RecallCommand),

    #[clap(about = "Show memory statistics")]
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info,somnus=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = Config::load(cli.config.as_deref())?;
    let store = SnapshotStore::new(
        cli.snapshot
            .clone()
            .unwrap_or_else(|| config.storage.snapshot_path.clone()),
    );
    tracing::debug!("Using snapshot at {}", store.path().display());

    match &cli.command {
        Command::Chat(cmd) => cmd.execute(&config, &store, format).await,
        Command::Sleep(cmd) => cmd.execute(&config, &store, format).await,
        Command::Memory(cmd) => cmd.execute(&store, format),
        Command::Recall(cmd) => cmd.execute(&config, &store, format).await,
        Command::Stats(cmd) => cmd.execute(&config, &store, format),
    }
}
