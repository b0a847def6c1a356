//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError` from
//! `dyndoc_core::storage`. Key violations become `AlreadyExists`.

use dyndoc_core::storage::RepositoryError;

/// Maps a rusqlite error to a RepositoryError.
///
/// # Error Mapping
///
/// - `SQLITE_CONSTRAINT_PRIMARYKEY` / `SQLITE_CONSTRAINT_UNIQUE` → `AlreadyExists`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `InvalidData`
/// - `CannotOpen` → `ConnectionFailed`
/// - All other errors → `QueryFailed`
fn map_rusqlite_error(err: &rusqlite::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.to_string(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepositoryError::InvalidData(format!(
                "{entity_type} {id} references a missing parent"
            ))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error for the entity with the given id.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl AsRef<str>,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id.as_ref())
        }
        tokio_rusqlite::Error::Close(_) | tokio_rusqlite::Error::ConnectionClosed => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn constraint(extended_code: i32) -> tokio_rusqlite::Error {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, None))
    }

    #[test]
    fn test_primary_key_maps_to_already_exists_with_id() {
        let result = map_tokio_rusqlite_error(
            constraint(ffi::SQLITE_CONSTRAINT_PRIMARYKEY),
            "Document",
            "abc-123",
        );

        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "Document",
                id: "abc-123".to_string(),
            }
        );
    }

    #[test]
    fn test_unique_maps_to_already_exists() {
        let result =
            map_tokio_rusqlite_error(constraint(ffi::SQLITE_CONSTRAINT_UNIQUE), "Database", "db");

        assert!(matches!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "Database",
                ..
            }
        ));
    }

    #[test]
    fn test_foreign_key_maps_to_invalid_data() {
        let result = map_tokio_rusqlite_error(
            constraint(ffi::SQLITE_CONSTRAINT_FOREIGNKEY),
            "Collection",
            "c",
        );

        assert!(matches!(result, RepositoryError::InvalidData(_)));
    }

    #[test]
    fn test_connection_closed_maps_to_connection_failed() {
        let result =
            map_tokio_rusqlite_error(tokio_rusqlite::Error::ConnectionClosed, "Document", "a");

        assert!(matches!(result, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_tokio_rusqlite_error(err, "Document", "a");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
