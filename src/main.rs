//! City weather service - hourly temperature forecasts over HTTP
//!
//! Serves an HTML page and a PNG temperature chart for a city, backed by the
//! Open-Meteo geocoding and forecast APIs with a cache in front.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cityweather::app::App;
use cityweather::cli::{Cli, ServiceConfig};
use cityweather::server::Server;

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_cli(&cli)?;
    let app = Arc::new(App::from_config(&config)?);

    let server = Server::bind(&config.listen_addr).await?;
    info!(address = %server.local_addr(), "cityweather started");

    server
        .run_until(
            move |request| {
                let app = Arc::clone(&app);
                async move { app.handle(request).await }
            },
            shutdown_signal(),
        )
        .await?;

    info!("cityweather stopped");
    Ok(())
}
