use anyhow::Result;
use clap::Parser;
use tracing::warn;

use conversion_forecast::config::Config;
use conversion_forecast::web::{ApiServer, AppState};

#[derive(Parser)]
#[command(name = "conversion-forecast")]
#[command(about = "Forecast API for daily conversion counts")]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the port from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            warn!("Could not read {} ({}), using defaults", cli.config, e);
            Config::default()
        }
    };

    let state = AppState::load(&config);
    let server = ApiServer::new(state);

    let port = cli.port.unwrap_or(config.server.port);
    server.start(&config.server.host, port).await
}
