//! Configuration module for Sitewarden
//!
//! This module defines the audit configuration (crawl limits, scan
//! thresholds, timeouts, and the ignored-extension blocklist) and handles
//! loading and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitewarden::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitewarden.toml")).unwrap();
//! println!("Crawling to depth {}", config.max_crawl_depth);
//! ```

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// File extensions that never resolve to a crawlable HTML page
const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz",
    ".7z", ".exe", ".msi", ".apk", ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".flv", ".jpg",
    ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".css", ".js",
];

/// Audit configuration for a crawl run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum number of link hops from the seed URL
    #[serde(rename = "max-crawl-depth")]
    pub max_crawl_depth: u32,

    /// Maximum recommended page title length in characters
    #[serde(rename = "max-title-length")]
    pub max_title_length: usize,

    /// Upper bound on concurrent scanner and link-probe workers
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Image responses larger than this many KiB are flagged
    #[serde(rename = "large-image-threshold-kb")]
    pub large_image_threshold_kb: u64,

    /// Page-load timeout in seconds
    #[serde(rename = "page-load-timeout-secs")]
    pub page_load_timeout_secs: u64,

    /// Per-link liveness probe timeout in seconds
    #[serde(rename = "link-probe-timeout-secs")]
    pub link_probe_timeout_secs: u64,

    /// URL path extensions that are never navigated
    #[serde(rename = "ignored-extensions")]
    pub ignored_extensions: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_crawl_depth: 1,
            max_title_length: 60,
            max_workers: 10,
            large_image_threshold_kb: 500,
            page_load_timeout_secs: 30,
            link_probe_timeout_secs: 3,
            ignored_extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl AuditConfig {
    /// Returns the page-load timeout as a [`Duration`]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Returns the link-probe timeout as a [`Duration`]
    pub fn link_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.link_probe_timeout_secs)
    }

    /// Returns the large-image threshold in bytes
    pub fn large_image_threshold_bytes(&self) -> f64 {
        (self.large_image_threshold_kb * 1024) as f64
    }
}

/// Loads and validates a TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the configuration file
///
/// # Returns
///
/// * `Ok(AuditConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
pub fn load_config(path: &Path) -> ConfigResult<AuditConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AuditConfig = toml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates a configuration's invariants
///
/// Checked rules:
/// - `max-workers` must be at least 1
/// - both timeouts must be at least 1 second
/// - every ignored extension must start with a dot
pub fn validate_config(config: &AuditConfig) -> ConfigResult<()> {
    if config.max_workers == 0 {
        return Err(ConfigError::Validation(
            "max-workers must be at least 1".to_string(),
        ));
    }

    if config.page_load_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page-load-timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.link_probe_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "link-probe-timeout-secs must be at least 1".to_string(),
        ));
    }

    for ext in &config.ignored_extensions {
        if !ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "ignored extension must start with '.': {}",
                ext
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AuditConfig::default();
        assert_eq!(config.max_crawl_depth, 1);
        assert_eq!(config.max_title_length, 60);
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.large_image_threshold_kb, 500);
        assert_eq!(config.page_load_timeout_secs, 30);
        assert_eq!(config.link_probe_timeout_secs, 3);
        assert!(config.ignored_extensions.contains(&".pdf".to_string()));
        assert!(config.ignored_extensions.contains(&".js".to_string()));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AuditConfig = toml::from_str("max-crawl-depth = 3").unwrap();
        assert_eq!(config.max_crawl_depth, 3);
        assert_eq!(config.max_title_length, 60);
        assert_eq!(config.max_workers, 10);
    }

    #[test]
    fn test_full_toml_parses() {
        let toml_str = r#"
            max-crawl-depth = 2
            max-title-length = 70
            max-workers = 4
            large-image-threshold-kb = 250
            page-load-timeout-secs = 10
            link-probe-timeout-secs = 1
            ignored-extensions = [".pdf", ".zip"]
        "#;
        let config: AuditConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_title_length, 70);
        assert_eq!(config.ignored_extensions.len(), 2);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = AuditConfig {
            max_workers: 0,
            ..AuditConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_extension_without_dot_rejected() {
        let config = AuditConfig {
            ignored_extensions: vec!["pdf".to_string()],
            ..AuditConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_threshold_bytes_conversion() {
        let config = AuditConfig::default();
        assert_eq!(config.large_image_threshold_bytes(), 512_000.0);
    }
}
