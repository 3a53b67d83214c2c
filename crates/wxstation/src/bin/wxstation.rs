//! wxstation exporter binary.
//!
//! Wires config, upstream client, cache, refresh loop, and HTTP
//! exposition endpoint together, with Ctrl+C shutdown.

use argh::FromArgs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wxstation::{server, Config, ObservationCache, WeatherClient};

#[derive(FromArgs)]
/// Prometheus exporter for NWS station weather observations
struct Args {
    /// path to the YAML configuration file (optional, uses defaults)
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// NWS station identifier (overrides config)
    #[argh(option, short = 's')]
    station: Option<String>,

    /// listen address, e.g. 0.0.0.0:5000 (overrides config)
    #[argh(option, short = 'l')]
    listen: Option<String>,

    /// refresh interval in seconds (overrides config)
    #[argh(option, short = 'i')]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    // Load configuration (or use defaults)
    let mut config = if let Some(config_path) = &args.config {
        match Config::from_file(config_path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to load config from '{}': {}", config_path, e);
                std::process::exit(1);
            }
        }
    } else {
        log::info!("No config file specified, using defaults");
        Config::default()
    };

    if let Some(station) = args.station {
        config.station = station;
    }
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(interval) = args.interval {
        config.refresh_interval_secs = interval;
    }
    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    log::info!(
        "Exporting station {} every {}s from {}",
        config.station,
        config.refresh_interval_secs,
        config.api_base
    );

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(());

    // Set up Ctrl+C handler
    ctrlc::set_handler({
        let shutdown_tx = shutdown_tx.clone();
        move || {
            log::info!("Received Ctrl+C, shutting down gracefully...");
            shutdown_tx.send(()).ok();
        }
    })?;

    let client = WeatherClient::new(&config)?;
    let cache = Arc::new(ObservationCache::new());

    // Background refresh loop
    let poller = tokio::spawn(wxstation::poller::run(
        client,
        Arc::clone(&cache),
        Duration::from_secs(config.refresh_interval_secs),
        shutdown_rx.clone(),
    ));

    // Exposition endpoint
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    log::info!("Serving metrics on http://{}/", config.listen);

    let state = server::AppState { cache };
    server::serve(listener, state, shutdown_rx).await?;

    poller.await?;
    log::info!("wxstation stopped.");

    Ok(())
}
