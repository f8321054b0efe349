//! Centralized service container shared by every request handler.
//!
//! Everything here is constructed once at startup and handed to the
//! routes behind an `Arc`; handlers never build their own clients.

use std::sync::Arc;

use agri_core::{Config, SecretProvider};
use agri_news::NewsAggregator;
use agri_services::{
    DiseaseCatalog, SharedStore, SqliteDocumentStore, SupplierDirectory, TaskService,
};
use agri_weather::WeatherProvider;
use anyhow::{Context, Result};

#[derive(Clone)]
pub struct AppServices {
    pub diseases: DiseaseCatalog,
    pub suppliers: SupplierDirectory,
    pub tasks: TaskService,
    pub weather: WeatherProvider,
    pub news: NewsAggregator,
}

impl AppServices {
    /// Wire the services over an already-open document store.
    pub fn new(
        config: &Config,
        store: SharedStore,
        secrets: Arc<dyn SecretProvider>,
    ) -> Result<Self> {
        let weather = WeatherProvider::new(&config.weather, secrets)
            .context("Failed to create weather client")?;
        let news = NewsAggregator::new(&config.news).context("Failed to create news client")?;

        Ok(Self {
            diseases: DiseaseCatalog::new(store.clone()),
            suppliers: SupplierDirectory::new(store.clone()),
            tasks: TaskService::new(store, config.tasks.list_failure_policy),
            weather,
            news,
        })
    }

    /// Open the SQLite document store named in the config and wire everything.
    pub fn from_config(config: &Config, secrets: Arc<dyn SecretProvider>) -> Result<Self> {
        let path = &config.storage.database_path;
        let store = SqliteDocumentStore::open(path)
            .with_context(|| format!("Failed to open document store at {}", path))?;
        tracing::info!("Document store opened at {}", path);

        Self::new(config, Arc::new(store), secrets)
    }
}
