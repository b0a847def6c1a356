//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the `DocumentStore`
//! trait using `aws-sdk-dynamodb`.
//!
//! Each collection is its own table named `{database}.{collection}`, keyed on
//! `id` alone so ids are unique per collection like in the other backends.
//! A partitioned collection stores the partition value in an attribute named
//! after the partition path and indexes it with the `partition` global
//! secondary index, so the partitioning of an existing table can be read back
//! from its description. DynamoDB has no database resource, so databases are
//! plain name prefixes.

mod conversions;
mod error;
mod store;

pub use store::DynamoDbDocumentStore;
