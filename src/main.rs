//! coalesce-cache CLI entry point.

use anyhow::Result;
use clap::Parser;

use coalesce_cache::cli::{handle_error, Cli, Commands};
use coalesce_cache::infrastructure::config::ConfigLoader;
use coalesce_cache::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, &cli.config, cli.json).await {
        handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: &std::path::Path, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(config_path)?;
    let _logger = LoggerImpl::init(&LogConfig::try_from(&config.logging)?)?;

    match command {
        Commands::Stress(args) => {
            coalesce_cache::cli::commands::stress::execute(args, config, json_mode).await
        }
        Commands::Scenario(args) => {
            coalesce_cache::cli::commands::scenario::execute(args, json_mode).await
        }
    }
}
