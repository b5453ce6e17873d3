//! Table layout of the inspection store.
//!
//! The store is owned by the upstream report-processing application; this
//! crate only reads it. The DDL mirrors the upstream layout (quoted,
//! camel-case identifiers) and is used to build stores for tests and
//! benchmarks:
//! - `Apartment` holds the unit number reports are keyed on
//! - `Report` holds one row per processed inspection document
//! - `WorkItem` holds one row per finding, pointing at its report and unit

use rusqlite::Connection;

/// Tables the read path depends on.
pub const REQUIRED_TABLES: [&str; 3] = ["Apartment", "Report", "WorkItem"];

pub const STORE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "Apartment" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "number" TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS "Apartment_number_key" ON "Apartment"("number");

CREATE TABLE IF NOT EXISTS "Report" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "fileName" TEXT,
    "reportDate" INTEGER NOT NULL,
    "processed" INTEGER NOT NULL DEFAULT 0,
    "hasErrors" INTEGER,
    "errorDetails" TEXT
);

CREATE INDEX IF NOT EXISTS "Report_reportDate_idx" ON "Report"("reportDate");

CREATE TABLE IF NOT EXISTS "WorkItem" (
    "id" TEXT NOT NULL PRIMARY KEY,
    "reportId" TEXT NOT NULL REFERENCES "Report"("id") ON DELETE CASCADE,
    "apartmentId" TEXT REFERENCES "Apartment"("id") ON DELETE SET NULL,
    "category" TEXT NOT NULL,
    "status" TEXT NOT NULL,
    "location" TEXT,
    "description" TEXT,
    "notes" TEXT
);

CREATE INDEX IF NOT EXISTS "WorkItem_reportId_idx" ON "WorkItem"("reportId");
CREATE INDEX IF NOT EXISTS "WorkItem_apartmentId_idx" ON "WorkItem"("apartmentId");
"#;

/// Create the store tables on an empty database.
///
/// # Errors
///
/// Returns an error if executing the DDL fails.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(STORE_SCHEMA_SQL)
}

/// Required tables absent from the connected database.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be queried.
pub fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
    )?;

    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            missing.push(table);
        }
    }
    Ok(missing)
}
