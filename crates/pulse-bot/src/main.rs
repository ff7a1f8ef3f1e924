//! Pulse swing bot - entry point.
//!
//! Replays candle data through the detection and lifecycle engines and
//! logs every setup/position event.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Impulse / first-extreme oscillator swing bot (replay runner)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PULSE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the candle data directory
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pulse_telemetry::init_logging()?;

    info!("Starting pulse bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > PULSE_CONFIG env var > default.
    let config_path = args
        .config
        .or_else(|| std::env::var("PULSE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let mut config = pulse_bot::BotConfig::from_file(&config_path)?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    let mut app = pulse_bot::App::new(config)?;
    app.run().await?;

    Ok(())
}
