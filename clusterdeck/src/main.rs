use clap::Parser;
use std::sync::Arc;

use clusterdeck::cli::{self, Cli, Commands};
use clusterdeck::{logging, tui, ClusterDeckResult, Config, HttpClusterService};

#[tokio::main]
async fn main() -> ClusterDeckResult<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };

    let interactive = matches!(cli.command, Commands::Tui);
    logging::init_logging(&config.logging, interactive)?;
    tracing::debug!("Using API endpoint {}", config.api.endpoint);

    let service = Arc::new(HttpClusterService::new(&config.api)?);

    match cli.command {
        Commands::Tui => tui::run(&config, service).await,
        Commands::Cluster { command } => {
            let mut stdout = std::io::stdout();
            cli::run_cluster_command(command, service.as_ref(), &config, &mut stdout).await
        }
    }
}
