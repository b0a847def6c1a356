//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Databases are plain namespaces
CREATE TABLE IF NOT EXISTS databases (
    id TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL
);

-- Collections remember the settings they were created with
CREATE TABLE IF NOT EXISTS collections (
    database_id TEXT NOT NULL,
    id TEXT NOT NULL,
    partition_path TEXT,
    throughput INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (database_id, id),
    FOREIGN KEY (database_id) REFERENCES databases(id) ON DELETE CASCADE
);

-- Documents store their full wire shape as JSON
CREATE TABLE IF NOT EXISTS documents (
    database_id TEXT NOT NULL,
    collection_id TEXT NOT NULL,
    id TEXT NOT NULL,
    partition_value TEXT,
    body TEXT NOT NULL,
    PRIMARY KEY (database_id, collection_id, id),
    FOREIGN KEY (database_id, collection_id)
        REFERENCES collections(database_id, id) ON DELETE CASCADE
);
"#;

// Database queries
pub const INSERT_DATABASE: &str = r#"
INSERT OR IGNORE INTO databases (id, created_at)
VALUES (?1, ?2)
"#;

pub const SELECT_DATABASE_EXISTS: &str = r#"
SELECT 1
FROM databases
WHERE id = ?1
"#;

// Collection queries
pub const INSERT_COLLECTION: &str = r#"
INSERT OR IGNORE INTO collections (database_id, id, partition_path, throughput, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_COLLECTION: &str = r#"
SELECT database_id, id, partition_path, throughput
FROM collections
WHERE database_id = ?1 AND id = ?2
"#;

// Document queries
pub const INSERT_DOCUMENT: &str = r#"
INSERT INTO documents (database_id, collection_id, id, partition_value, body)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_DOCUMENT: &str = r#"
SELECT partition_value, body
FROM documents
WHERE database_id = ?1 AND collection_id = ?2 AND id = ?3
"#;
