mod analyze;
mod cache;
mod chains;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::CacheCommands;
use crate::chains::ChainsCommands;

#[derive(Debug, Parser)]
#[command(name = "sitewise")]
#[command(about = "Business site feasibility advisor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse a free-text question such as "Should I open a cafe near Homeland Heights?"
    Analyze {
        query: String,

        /// Print the report as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// Inspect chain data
    Chains {
        #[command(subcommand)]
        command: ChainsCommands,
    },
    /// Manage the local SQLite cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sitewise: run `sitewise --help` for commands");
        return Ok(());
    };

    let config = sitewise_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so `analyze --json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Analyze { query, json } => analyze::run_analyze(&config, &query, json).await?,
        Commands::Chains { command } => match command {
            ChainsCommands::Stats { top } => chains::run_chains_stats(&config, top)?,
            ChainsCommands::Detect { path } => chains::run_chains_detect(&config, &path)?,
        },
        Commands::Cache { command } => match command {
            CacheCommands::Migrate => cache::run_cache_migrate(&config).await?,
        },
    }

    Ok(())
}
