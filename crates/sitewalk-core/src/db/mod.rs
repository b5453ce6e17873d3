//! Read-only access to the inspection store.
//!
//! Connections are opened with:
//! - `SQLITE_OPEN_READ_ONLY` and `query_only = ON`, since the store belongs to
//!   another application
//! - `busy_timeout = 5s` so a concurrent writer does not fail a report run

pub mod query;
pub mod schema;

use anyhow::Result;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorCode;

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures opening the store that callers want to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("inspection store not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("inspection store at {} is missing tables: {}", .path.display(), .missing.join(", "))]
    SchemaMismatch {
        path: PathBuf,
        missing: Vec<&'static str>,
    },
    #[error("inspection store at {} could not be opened", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::StoreNotFound,
            Self::SchemaMismatch { .. } => ErrorCode::StoreSchemaMismatch,
            Self::Unreadable { .. } => ErrorCode::StoreOpenFailed,
        }
    }
}

/// Open the store read-only and check the tables the read path needs.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when `path` does not exist,
/// [`StoreError::SchemaMismatch`] when a required table is absent, and
/// [`StoreError::Unreadable`] when SQLite cannot open or read the file.
pub fn open_store(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()).into());
    }

    let unreadable = |source| StoreError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(unreadable)?;

    configure_connection(&conn).map_err(unreadable)?;

    // First read of the file; a non-SQLite file fails here.
    let missing = schema::missing_tables(&conn).map_err(unreadable)?;
    if !missing.is_empty() {
        return Err(StoreError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        }
        .into());
    }

    tracing::debug!(path = %path.display(), "inspection store opened");
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "query_only", "ON")?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_BUSY_TIMEOUT, StoreError, open_store, schema};
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn temp_db_path() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("dev.db");
        (dir, path)
    }

    #[test]
    fn open_store_is_read_only_with_busy_timeout() {
        let (_dir, path) = temp_db_path();
        {
            let conn = Connection::open(&path).expect("create db");
            schema::create_schema(&conn).expect("create schema");
        }

        let conn = open_store(&path).expect("open store");

        let busy_timeout_ms: u64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .expect("query busy_timeout");
        assert_eq!(
            u128::from(busy_timeout_ms),
            DEFAULT_BUSY_TIMEOUT.as_millis()
        );

        let write = conn.execute(
            r#"INSERT INTO "Apartment" ("id", "number") VALUES ('a1', '7')"#,
            [],
        );
        assert!(write.is_err(), "store must reject writes");
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, path) = temp_db_path();
        let err = open_store(&path).expect_err("missing file must fail");
        let store_err = err.downcast_ref::<StoreError>().expect("typed store error");
        assert!(matches!(store_err, StoreError::NotFound(_)));
        assert_eq!(store_err.code().code(), "E1101");
        assert!(!path.exists(), "read-only open must not create the file");
    }

    #[test]
    fn foreign_database_is_schema_mismatch() {
        let (_dir, path) = temp_db_path();
        {
            let conn = Connection::open(&path).expect("create db");
            conn.execute_batch("CREATE TABLE unrelated (id INTEGER);")
                .expect("create table");
        }

        let err = open_store(&path).expect_err("foreign db must fail");
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::SchemaMismatch { missing, .. }) => {
                assert_eq!(missing, &vec!["Apartment", "Report", "WorkItem"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let (_dir, path) = temp_db_path();
        std::fs::write(&path, b"this is not a sqlite database, just some bytes padding it out")
            .expect("write file");

        let err = open_store(&path).expect_err("garbage must fail");
        let store_err = err.downcast_ref::<StoreError>().expect("typed store error");
        assert!(matches!(store_err, StoreError::Unreadable { .. }));
        assert_eq!(store_err.code().code(), "E1102");
    }
}
