//! Server startup and graceful shutdown.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use agri_core::ServerConfig;
use anyhow::{Context, Result};

use crate::app_services::AppServices;
use crate::routes::routes;

/// Serve the API until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, services: Arc<AppServices>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let ip: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid server host: {}", config.host))?;
    let addr = SocketAddr::new(ip, config.port);

    let (bound, server) = warp::serve(routes(services))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("AgriAssist API listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}
