//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the `DocumentStore`
//! trait that keeps everything in HashMaps wrapped in `Arc<RwLock<_>>`. It
//! backs the default build and stands in for the real stores in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use dyndoc::storage::inmemory::InMemoryDocumentStore;
//!
//! let store = InMemoryDocumentStore::new();
//! let db = store.create_database_if_absent("AzureFunctionTests").await?;
//! ```

mod store;

pub use store::InMemoryDocumentStore;
