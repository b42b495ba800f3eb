//! Storage module for persisting crawl output
//!
//! This module handles all database operations for the job pipeline:
//! - SQLite database initialization and schema management
//! - The crawl-job queue (earliest job first)
//! - Page record and notification persistence

mod schema;
mod sqlite;

pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;

use thiserror::Error;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A pending crawl job pulled from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub queue_id: i64,
    pub project_id: i64,
    pub url: String,
}

/// A persisted notification row, as read back from the database
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub project_id: i64,
    pub url: String,
    pub category: String,
    pub message: String,
}
