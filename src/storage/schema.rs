//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitewarden
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Pending crawl jobs, processed earliest-first
CREATE TABLE IF NOT EXISTS crawl_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    time_start TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_queue_time ON crawl_queue(time_start);

-- One row per successfully crawled page
CREATE TABLE IF NOT EXISTS crawl_result (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    html TEXT NOT NULL,
    ttfb_ms REAL,
    render_time_ms REAL,
    time_crawled TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_result_project ON crawl_result(project_id);

-- Diagnostic notifications attached to crawled pages
CREATE TABLE IF NOT EXISTS page_notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    category TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_page_notifications_project ON page_notifications(project_id);
CREATE INDEX IF NOT EXISTS idx_page_notifications_category ON page_notifications(category);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["crawl_queue", "crawl_result", "page_notifications"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
