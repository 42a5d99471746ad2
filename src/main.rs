//! Gemscout CLI entry point.

use anyhow::Result;
use clap::Parser;

use gemscout::cli::commands::{self, CommandContext};
use gemscout::cli::{Cli, Commands};
use gemscout::domain::models::Config;
use gemscout::infrastructure::config::ConfigLoader;
use gemscout::infrastructure::logging::{LogConfig, LoggerImpl};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => gemscout::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => gemscout::cli::handle_error(err, cli.json),
    };

    let json = cli.json;
    let ctx = CommandContext::new(config, cli.token, json);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, ctx).await,
        Commands::Top(args) => commands::top::execute(args, ctx).await,
        Commands::Recent(args) => commands::recent::execute(args, ctx).await,
        Commands::Improve => commands::improve::execute(ctx).await,
        Commands::Ideas(args) => commands::ideas::execute(args, ctx).await,
        Commands::Report(args) => commands::report::execute(args, ctx).await,
        Commands::Status => commands::status::execute(ctx).await,
    };

    if let Err(err) = result {
        gemscout::cli::handle_error(err, json);
    }
}
