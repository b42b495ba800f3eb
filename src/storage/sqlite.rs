//! SQLite storage implementation

use crate::report::PageRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::{CrawlJob, NotificationRow, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend for the job pipeline
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened and initialized
    /// * `Err(StorageError)` - Failed to open or initialize
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and dry runs)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Job queue =====

    /// Enqueues a crawl job for a project
    pub fn enqueue_job(&mut self, project_id: i64, url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_queue (project_id, url, time_start) VALUES (?1, ?2, ?3)",
            params![project_id, url, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Returns the queued job with the earliest start time, if any
    pub fn next_job(&self) -> StorageResult<Option<CrawlJob>> {
        let job = self
            .conn
            .query_row(
                "SELECT id, project_id, url FROM crawl_queue ORDER BY time_start ASC, id ASC LIMIT 1",
                [],
                |row| {
                    Ok(CrawlJob {
                        queue_id: row.get(0)?,
                        project_id: row.get(1)?,
                        url: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(job)
    }

    /// Removes a completed job from the queue
    pub fn remove_job(&mut self, queue_id: i64) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM crawl_queue WHERE id = ?1", params![queue_id])?;
        Ok(())
    }

    /// Number of jobs currently queued
    pub fn queue_len(&self) -> StorageResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawl_queue", [], |row| row.get(0))?;
        Ok(count)
    }

    // ===== Crawl results =====

    /// Persists one finished page and all its notifications in a single
    /// transaction
    pub fn save_page(&mut self, project_id: i64, record: &PageRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO crawl_result (project_id, url, html, ttfb_ms, render_time_ms, time_crawled)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project_id,
                record.url,
                record.html,
                record.ttfb_ms,
                record.render_time_ms,
                now
            ],
        )?;

        for notification in &record.notifications {
            tx.execute(
                "INSERT INTO page_notifications (project_id, url, category, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project_id,
                    record.url,
                    notification.category.as_str(),
                    notification.message,
                    now
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Number of pages stored for a project
    pub fn page_count(&self, project_id: i64) -> StorageResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM crawl_result WHERE project_id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// All stored notifications for a project, oldest first
    pub fn notifications(&self, project_id: i64) -> StorageResult<Vec<NotificationRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT project_id, url, category, message FROM page_notifications
             WHERE project_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok(NotificationRow {
                    project_id: row.get(0)?,
                    url: row.get(1)?,
                    category: row.get(2)?,
                    message: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
