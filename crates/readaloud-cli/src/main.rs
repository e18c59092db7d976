//! CLI entry point.

use anyhow::Result;
use clap::Parser;
use readaloud_cli::{Cli, CliContext, Commands, handlers};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::from_cli(&cli);

    match cli.command {
        Commands::Captions { file, json } => handlers::captions::execute(&ctx, &file, json).await?,
        Commands::Match { captions, fragment } => {
            handlers::matching::execute(&captions, &fragment).await?;
        }
        Commands::Play(args) => handlers::play::execute(&ctx, args).await?,
        Commands::Pronounce { word, speed } => {
            handlers::pronounce::execute(&ctx, &word, speed).await?;
        }
        Commands::Define { word } => handlers::define::execute(&ctx, &word).await?,
    }

    Ok(())
}
