use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use dotenv::dotenv;
use tokio::{net::TcpListener, signal::ctrl_c};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use picnic_planner::{Config, PicnicPlanner};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine, the environment may be set up otherwise.
    let dotenv_result = dotenv();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenv_result {
        info!("No .env file loaded: {e}");
    }

    let config = Config::from_env()?;
    let planner = Arc::new(PicnicPlanner::new(&config).await?);

    let app = PicnicPlanner::install_routes(Router::new()).with_state(planner);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Binding to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
