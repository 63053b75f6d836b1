use crate::Config;
use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Render the config as TOML with the API key masked.
pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(&config.redacted()).context("serialize config")
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting blindchat gateway on {host} (random port)");
            } else {
                info!("Starting blindchat gateway on {host}:{port}");
            }
            crate::gateway::run_gateway(&host, port, Arc::clone(&config)).await
        }

        Commands::Config => {
            println!("# {}", config.config_path.display());
            print!("{}", render_config(&config)?);
            Ok(())
        }
    }
}
