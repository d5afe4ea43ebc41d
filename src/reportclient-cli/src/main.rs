use anyhow::Result;
use reportclient_rs::{ClientConfig, ReportClient};

mod commands;
mod telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = telemetry::init_telemetry()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match commands::Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, commands::USAGE);
            std::process::exit(2);
        }
    };

    // Load configuration
    let mut config = ClientConfig::load("config.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load config.json, using defaults");
        ClientConfig::default()
    });
    if let Ok(token) = std::env::var("REPORTCLIENT_AUTHTOKEN") {
        config.authtoken = token;
    }
    if config.authtoken.is_empty() {
        tracing::warn!("No authtoken configured; requests will be rejected by the server");
    }

    tracing::info!("reportclient starting");
    tracing::info!("  Base URL: {}", config.base_url);
    tracing::info!(
        "  Proxy: {}",
        config
            .proxy
            .as_ref()
            .map(|p| p.url())
            .unwrap_or_else(|| "none".to_string())
    );
    tracing::info!(
        "  Timeouts: connect={:?}s, read={:?}s",
        config.connection_timeout_secs,
        config.read_timeout_secs
    );

    let client = ReportClient::from_config(config)?;

    if let Err(e) = commands::run(&client, command).await {
        tracing::error!("Command failed: {}", e);
        return Err(e);
    }

    Ok(())
}
