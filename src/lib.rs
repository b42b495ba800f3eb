//! Sitewarden: a browser-driven site auditor
//!
//! This crate implements a same-domain web crawler that drives a headless
//! browser session, runs diagnostic scanners (SEO, accessibility, network,
//! security) against every rendered page, and persists page records plus
//! notifications for a job pipeline.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod report;
pub mod scan;
pub mod service;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewarden operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Seed URL has no host: {0}")]
    SeedWithoutHost(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Sitewarden operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use browser::{BrowserDriver, BrowserError, FakeBrowser};
pub use config::AuditConfig;
pub use crawler::{NavigationOutcome, SiteCrawler, SkipReason};
pub use report::{Notification, NotificationCategory, PageRecord};
