//! Astrai - conversational neural core and daily signal feed
//!
//! Main entry point for the Astrai command-line client.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use astrai::cli::{Cli, Commands};
use astrai::commands;
use astrai::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(locale = %config.locale, "Configuration loaded");

    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config).await?;
        }
        Commands::Daily => {
            tracing::info!("Loading daily signals");
            commands::content::run_daily(config).await?;
        }
        Commands::Insight => {
            tracing::info!("Loading deep insight");
            commands::content::run_insight(config).await?;
        }
        Commands::Read { post_id } => {
            tracing::info!("Reading post {}", post_id);
            commands::content::run_read(config, &post_id).await?;
        }
    }
    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they do not interleave with chat output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "astrai=debug" } else { "astrai=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
