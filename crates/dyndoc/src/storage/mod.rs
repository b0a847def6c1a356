//! Document store backends.
//!
//! This module provides concrete implementations of the
//! `dyndoc_core::storage::DocumentStore` trait. The backend used by the
//! server is selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local store, nothing survives a restart
//! - `sqlite`: SQLite store using `rusqlite` and `tokio-rusqlite`
//! - `dynamodb`: AWS DynamoDB store using `aws-sdk-dynamodb`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time. The in-memory store is always compiled because tests
//! use it as a stand-in for the real backends.
//!
//! # Examples
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p dyndoc --no-default-features --features sqlite
//! ```
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p dyndoc --no-default-features --features dynamodb
//! ```

use std::sync::Arc;

use dyndoc_core::storage::{DocumentStore, Result};

use crate::config::Config;

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "sqlite", feature = "dynamodb"))]
compile_error!("Cannot enable both 'sqlite' and 'dynamodb' storage features");

#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!("Cannot enable both 'sqlite' and 'inmemory' storage features");

#[cfg(all(feature = "dynamodb", feature = "inmemory"))]
compile_error!("Cannot enable both 'dynamodb' and 'inmemory' storage features");

#[cfg(not(any(feature = "inmemory", feature = "sqlite", feature = "dynamodb")))]
compile_error!("Must enable exactly one storage feature: 'inmemory', 'sqlite', or 'dynamodb'");

#[cfg_attr(not(feature = "inmemory"), allow(dead_code))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[allow(unused_imports)]
pub use inmemory::InMemoryDocumentStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDocumentStore;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbDocumentStore;

/// Build the store client for the enabled backend.
#[cfg(feature = "inmemory")]
pub async fn connect_store(_config: &Config) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!(backend = "inmemory", "Connecting document store");
    Ok(Arc::new(InMemoryDocumentStore::new()))
}

/// Build the store client for the enabled backend.
#[cfg(feature = "sqlite")]
pub async fn connect_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!(backend = "sqlite", path = %config.sqlite_path, "Connecting document store");
    Ok(Arc::new(SqliteDocumentStore::new(&config.sqlite_path).await?))
}

/// Build the store client for the enabled backend.
#[cfg(feature = "dynamodb")]
pub async fn connect_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!(
        backend = "dynamodb",
        endpoint = ?config.store_endpoint,
        local_emulator = config.uses_local_emulator(),
        "Connecting document store"
    );
    Ok(Arc::new(DynamoDbDocumentStore::from_config(config).await?))
}
