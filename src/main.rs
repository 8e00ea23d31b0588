use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use weather_lookup::web::{self, AppState};
use weather_lookup::{AppConfig, VERSION, WeatherService, logging};

/// Weather lookup web service
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging)?;
    tracing::info!("Starting weather-lookup {}", VERSION);

    let service = WeatherService::from_config(&config)?;
    web::run(&config.server, AppState::new(service)).await
}
