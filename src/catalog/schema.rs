//! Database schema definitions.

use rusqlite::Connection;

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the catalog database.
///
/// Timestamps are stored as INTEGER (Unix milliseconds). List-valued
/// columns hold JSON arrays, normalized on ingest. The embedding column
/// holds little-endian f32 bytes; a NULL embedding means the row is not
/// retrievable by vector search until the regeneration job fills it.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    url TEXT,
    remote_testing INTEGER NOT NULL DEFAULT 0,
    adaptive_irt INTEGER NOT NULL DEFAULT 0,
    test_types TEXT NOT NULL DEFAULT '[]',
    job_levels TEXT NOT NULL DEFAULT '[]',
    languages TEXT NOT NULL DEFAULT '[]',
    key_features TEXT NOT NULL DEFAULT '[]',
    duration_text TEXT,
    duration_min_minutes INTEGER,
    duration_max_minutes INTEGER,
    is_untimed INTEGER NOT NULL DEFAULT 0,
    is_variable_duration INTEGER NOT NULL DEFAULT 0,
    embedding BLOB,
    embedding_dimensions INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_assessments_name ON assessments(name);
CREATE INDEX IF NOT EXISTS idx_assessments_remote ON assessments(remote_testing);
";

/// Apply the schema to a connection, recording the version.
///
/// Idempotent: every statement is `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at)
         VALUES (?1, ?2)",
        rusqlite::params![
            CURRENT_SCHEMA_VERSION,
            chrono::Utc::now().timestamp_millis()
        ],
    )?;
    Ok(())
}
