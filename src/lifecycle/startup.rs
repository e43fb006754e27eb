//! Startup orchestration.
//!
//! # Responsibilities
//! - Start background services (metrics exporter, signal handler)
//! - Bind the listener and serve the router until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when the router is built)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RouterConfig;
use crate::dispatch::Router;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_handler;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Serve `router` with `config` until Ctrl-C or `shutdown` fires.
pub async fn run(
    config: RouterConfig,
    router: Router,
    shutdown: Arc<Shutdown>,
) -> Result<(), StartupError> {
    // 1. Metrics
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // 2. Signals
    let stop = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    // 3. Listener
    let address = config.server.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr()?,
        services = router.services().len(),
        endpoints = router.endpoints().len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Listening for connections"
    );

    // 4. Serve
    let server = HttpServer::new(config.server, Arc::new(router));
    server.run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
