//! mqtt-sysmon - console health monitor for an MQTT broker
//!
//! Subscribes to the broker's `$SYS` status topics and shows uptime, heap,
//! subscription and connection figures, refreshed once per second.
//!
//! Module structure:
//! - `domain/` - Topic list, payload decoder, display state
//! - `io/` - MQTT session, terminal
//! - `services/` - Lifecycle and shutdown latch
//! - `ui/` - Widget set and render loop
//! - `infra/` - Config, metrics

use clap::{ArgAction, Parser};
use mqtt_sysmon::infra::config::{Config, DEFAULT_BROKER_URL};
use mqtt_sysmon::services::lifecycle;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// A console based MQTT broker health monitor
#[derive(Parser, Debug)]
#[command(name = "mqtt-sysmon", version, about, disable_version_flag = true)]
struct Args {
    /// Address of the broker to connect with
    #[arg(short, long, default_value = DEFAULT_BROKER_URL)]
    broker: String,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The dashboard owns the terminal, so logging is off unless RUST_LOG is
    // set; redirect stderr to a file when enabling it
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = Config::from_broker_url(&args.broker)?;

    info!(broker = %config.broker(), client_id = %config.client_id(), "mqtt-sysmon starting");

    lifecycle::run(config).await?;

    info!("mqtt-sysmon shutdown complete");
    Ok(())
}
