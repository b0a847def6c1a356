//! Shared application state.
//!
//! Handlers reach the document store through a repository that is built on
//! first use and shared by every request afterwards.

use std::sync::Arc;

use dyndoc_core::storage::DocumentStore;

use crate::bootstrap::Bootstrap;
use crate::config::Config;
use crate::repository::InventoryRepository;
use crate::storage::connect_store;

/// Shared application state.
///
/// Cloned for each request handler. The repository is connected lazily so
/// the server starts even while the store is unreachable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Store used instead of the configured backend, for tests.
    store_override: Option<Arc<dyn DocumentStore>>,
    repository: Arc<Bootstrap<InventoryRepository>>,
}

impl AppState {
    /// Creates state for the backend selected at compile time.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            store_override: None,
            repository: Arc::new(Bootstrap::new()),
        }
    }

    /// Creates state that talks to `store` instead of the configured backend.
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store_override: Some(store),
            ..Self::new(config)
        }
    }

    /// Returns the inventory repository, connecting it on first use.
    pub async fn repository(&self) -> anyhow::Result<Arc<InventoryRepository>> {
        self.repository
            .get_or_try_init(|| async {
                let store = match &self.store_override {
                    Some(store) => store.clone(),
                    None => connect_store(&self.config).await?,
                };
                let repository =
                    InventoryRepository::connect(store, self.config.store_settings()).await?;
                Ok::<_, anyhow::Error>(repository)
            })
            .await
    }
}

impl Default for AppState {
    /// Creates state backed by a fresh in-memory store.
    fn default() -> Self {
        let store = Arc::new(crate::storage::InMemoryDocumentStore::new());
        Self::with_store(Config::from_env(), store)
    }
}
