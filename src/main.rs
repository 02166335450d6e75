use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use weather_relay::config::ServerOverrides;
use weather_relay::{RelayConfig, logging, web};

/// Weather relay - forwards geocoding and forecast lookups to Open-Meteo
#[derive(Parser, Debug)]
#[command(name = "weather-relay", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Interface to bind, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the configuration
    #[arg(long, short = 'p', env = "PORT")]
    port: Option<u16>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ServerOverrides {
        host: cli.host,
        port: cli.port,
    };
    let config = RelayConfig::load(cli.config.clone(), overrides)?;

    logging::init(&config.logging, cli.verbose);
    match &cli.config {
        Some(path) => tracing::info!("Using config from: {}", path.display()),
        None => {
            let default_file = RelayConfig::default_config_file();
            if default_file.exists() {
                tracing::info!("Using config from: {}", default_file.display());
            } else {
                tracing::info!("No config file at {}, using defaults", default_file.display());
            }
        }
    }
    tracing::debug!("Loaded configuration: {:?}", config);

    web::run(config).await
}
