use std::sync::Arc;

use agri_api::AppServices;
use agri_core::{Config, EnvSecrets};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    agri_core::init()?;

    let (config, _) = Config::load_validated()?;
    let services = AppServices::from_config(&config, Arc::new(EnvSecrets))?;

    tracing::info!("AgriAssist starting");

    agri_api::serve(&config.server, Arc::new(services), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    })
    .await?;

    tracing::info!("AgriAssist stopped");
    Ok(())
}
