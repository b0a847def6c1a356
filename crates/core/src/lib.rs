//! Core of the dyndoc project.
//!
//! Holds the dynamic document model and the contracts a document store has to
//! honour. Everything in here is pure: no network, no filesystem, no clocks
//! beyond stamping a creation time on new documents.

pub mod document;
pub mod storage;
