//! Crawl engine module
//!
//! This module contains the core crawling logic, including:
//! - Navigation control and redirect classification
//! - Breadth-first frontier scheduling with depth limiting
//! - Per-page orchestration of the diagnostic scanners
//! - Page record emission in frontier order

mod navigator;
mod scheduler;

pub use navigator::{NavigationOutcome, Navigator, SkipReason};
pub use scheduler::{PageCallback, SiteCrawler};

use crate::browser::BrowserDriver;
use crate::config::AuditConfig;
use crate::report::PageRecord;
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl of one site
///
/// Convenience wrapper that builds a [`SiteCrawler`] and drives it to
/// completion.
///
/// # Arguments
///
/// * `driver` - The browser session the crawl exclusively owns
/// * `seed_url` - Where the crawl starts
/// * `config` - Crawl limits and scan thresholds
///
/// # Returns
///
/// * `Ok(Vec<PageRecord>)` - Finished pages in breadth-first order
/// * `Err(CrawlError)` - Setup failed; per-page errors never surface here
pub async fn crawl_site(
    driver: Arc<dyn BrowserDriver>,
    seed_url: &str,
    config: AuditConfig,
) -> Result<Vec<PageRecord>> {
    let mut crawler = SiteCrawler::new(driver, seed_url, config)?;
    crawler.crawl().await
}
