mod aggregator;
mod config;
mod http;
mod models;
mod sensor;
mod utils;

use log::{error, info, warn};
use std::future::IntoFuture;
use tokio::net::TcpListener;

use aggregator::{Aggregator, WINDOW_CAPACITY};
use config::MonitorConfig;
use sensor::{open_device, run_pipeline};
use utils::resolve_local_offset;

// Single-threaded runtime: the local UTC offset can only be read while the
// process has one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let offset = resolve_local_offset(config.utc_offset);
    let (mut aggregator, summaries) = Aggregator::new(WINDOW_CAPACITY, offset);
    info!("Publishing a summary every {} valid readings", aggregator.capacity());

    let device = match open_device(&config.serial_port).await {
        Ok(device) => device,
        Err(e) => {
            error!("Failed to open {}: {}", config.serial_port, e);
            return Err(e.into());
        }
    };

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);
    let server = axum::serve(listener, http::router(summaries)).into_future();

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        let _ = tx.send(());
    });

    // Run the sensor pipeline and HTTP server until one stops or shutdown is requested
    tokio::select! {
        result = run_pipeline(device, &mut aggregator) => {
            match result {
                Ok(stats) => warn!(
                    "Sensor stream closed after {} readings and {} summaries ({} rejected)",
                    stats.accepted,
                    stats.summaries_published,
                    stats.rejected()
                ),
                Err(e) => {
                    error!("Sensor read failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        result = server => {
            if let Err(e) = result {
                error!("HTTP server failed: {}", e);
                return Err(e.into());
            }
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    if aggregator.pending() > 0 {
        info!("Discarding {} readings from the unfinished window", aggregator.pending());
    }

    Ok(())
}
