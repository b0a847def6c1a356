//! HTTP status codes for store failures.

use super::RepositoryError;

/// Entity name used for document-level errors.
const DOCUMENT_ENTITY: &str = "Document";

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// A missing document is the caller's problem (404). A missing database or
/// collection during a write means the store layout is gone from under the
/// server, so it is reported as 500 rather than 404.
///
/// ```
/// use dyndoc_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Document",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { entity_type, .. } if *entity_type == DOCUMENT_ENTITY => 404,
        RepositoryError::NotFound { .. } => 500,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
    }
}
