//! modechat - chatbot with memory and conversation modes
//!
#![doc = "Main entry point for the modechat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use modechat::cli::{Cli, Commands};
use modechat::commands;
use modechat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Starting web chat server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Chat { mode, .. } => {
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            commands::chat::run_chat(config, mode).await?;
            Ok(())
        }
        Commands::Ask { prompt, mode, .. } => {
            tracing::debug!("Answering one-shot prompt");
            commands::ask::run_ask(config, prompt, mode).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` raises the crate level to
/// debug.
fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "modechat=debug" } else { "modechat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
