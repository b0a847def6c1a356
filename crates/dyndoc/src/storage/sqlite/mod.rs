//! SQLite storage backend implementation.
//!
//! This module provides a SQLite-based implementation of the `DocumentStore`
//! trait using `rusqlite` for synchronous operations and `tokio-rusqlite` for
//! async wrapping. Document bodies are kept as JSON text next to the columns
//! needed for addressing and partitioning.

mod error;
mod schema;
mod store;

pub use store::SqliteDocumentStore;
