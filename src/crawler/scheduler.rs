//! Breadth-first crawl scheduling
//!
//! The scheduler owns the frontier, the visited and queued sets, and the
//! per-page orchestration sequence. Navigation is strictly sequential
//! because the browser session is single and stateful; parallelism only
//! exists inside the processing of an already-loaded page.

use crate::browser::telemetry::TelemetryReader;
use crate::browser::{BrowserDriver, BrowserError};
use crate::config::AuditConfig;
use crate::crawler::navigator::{NavigationOutcome, Navigator};
use crate::report::{Notification, NotificationCategory, PageRecord};
use crate::scan::{run_scanners, scan_external_resources, PageContext};
use crate::url::{is_same_domain, is_valid_url, normalize_url};
use crate::{CrawlError, Result};
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

/// Callback invoked once per finished page, in breadth-first order
pub type PageCallback = Box<dyn FnMut(&PageRecord) + Send>;

/// A discovered URL waiting in the frontier
#[derive(Debug, Clone)]
struct FrontierEntry {
    url: String,
    depth: u32,
}

/// The crawl engine: breadth-first traversal of one site through one
/// browser session
///
/// # Example
///
/// ```no_run
/// use sitewarden::browser::ChromeDriver;
/// use sitewarden::config::AuditConfig;
/// use sitewarden::crawler::SiteCrawler;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn run() -> sitewarden::Result<()> {
/// let driver = Arc::new(ChromeDriver::launch(Duration::from_secs(300))?);
/// let mut crawler = SiteCrawler::new(driver, "https://example.com/", AuditConfig::default())?;
/// let pages = crawler.crawl().await?;
/// println!("Crawled {} pages", pages.len());
/// # Ok(())
/// # }
/// ```
pub struct SiteCrawler {
    driver: Arc<dyn BrowserDriver>,
    config: Arc<AuditConfig>,
    seed: Url,
    http: reqwest::Client,
    navigator: Navigator,
    telemetry: TelemetryReader,
    visited: HashSet<String>,
    queued: HashSet<String>,
    callback: Option<PageCallback>,
}

impl SiteCrawler {
    /// Creates a crawl engine around an injected browser session
    ///
    /// # Arguments
    ///
    /// * `driver` - The browser session this crawl exclusively owns
    /// * `seed_url` - Where the crawl starts; its host defines the domain
    ///   boundary
    /// * `config` - Crawl limits and scan thresholds
    ///
    /// # Returns
    ///
    /// * `Ok(SiteCrawler)` - Ready to crawl
    /// * `Err(CrawlError)` - The seed URL is unusable or the probe client
    ///   could not be built
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        seed_url: &str,
        config: AuditConfig,
    ) -> Result<Self> {
        let seed = Url::parse(seed_url)?;
        if seed.host_str().is_none() {
            return Err(CrawlError::SeedWithoutHost(seed_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .user_agent(format!("sitewarden/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.link_probe_timeout())
            .connect_timeout(config.link_probe_timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let config = Arc::new(config);
        let navigator = Navigator::new(Arc::clone(&driver), Arc::clone(&config));
        let telemetry = TelemetryReader::new(Arc::clone(&driver));

        Ok(Self {
            driver,
            config,
            seed,
            http,
            navigator,
            telemetry,
            visited: HashSet::new(),
            queued: HashSet::new(),
            callback: None,
        })
    }

    /// Registers a callback invoked with every finished page record
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&PageRecord) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Number of normalized URLs dequeued so far (including skipped ones)
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Runs the crawl to completion and returns the finished page records
    /// in breadth-first order
    ///
    /// Per-URL failures (navigation errors, scanner crashes, DOM read
    /// failures) are logged and skipped; the crawl always returns
    /// whatever pages were successfully produced.
    pub async fn crawl(&mut self) -> Result<Vec<PageRecord>> {
        let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
        frontier.push_back(FrontierEntry {
            url: self.seed.to_string(),
            depth: 0,
        });
        self.queued.insert(normalize_url(self.seed.as_str()));

        let mut pages = Vec::new();
        let mut current_depth = 0u32;

        while !frontier.is_empty() && current_depth <= self.config.max_crawl_depth {
            // Drain the whole level into a batch, marking each URL visited
            // at dequeue time so a same-level duplicate cannot slip in.
            let mut batch = Vec::new();
            while frontier
                .front()
                .map_or(false, |entry| entry.depth == current_depth)
            {
                if let Some(entry) = frontier.pop_front() {
                    let normalized = normalize_url(&entry.url);
                    if self.visited.insert(normalized) {
                        batch.push(entry.url);
                    }
                }
            }

            for url in batch {
                tracing::info!(
                    "Crawling {} at depth {}/{}",
                    url,
                    current_depth,
                    self.config.max_crawl_depth
                );

                let outcome = self.navigator.navigate(&mut self.telemetry, &url).await;
                if !outcome.should_continue {
                    tracing::debug!("Skipping {}: {:?}", url, outcome.skip_reason);
                    continue;
                }

                match self.process_page(&url, &outcome).await {
                    Ok(record) => {
                        if let Some(callback) = &mut self.callback {
                            callback(&record);
                        }
                        if current_depth < self.config.max_crawl_depth {
                            self.discover_links(&record, &mut frontier, current_depth + 1);
                        }
                        pages.push(record);
                    }
                    Err(error) => tracing::warn!("Error crawling {}: {}", url, error),
                }
            }

            match frontier.front() {
                Some(entry) => current_depth = entry.depth,
                None => break,
            }
        }

        tracing::info!(
            "Finished crawling {}. Visited {} URL(s), produced {} page record(s).",
            self.seed,
            self.visited.len(),
            pages.len()
        );
        Ok(pages)
    }

    /// Builds the finished record for one successfully navigated page
    async fn process_page(
        &mut self,
        requested_url: &str,
        outcome: &NavigationOutcome,
    ) -> Result<PageRecord> {
        let final_url = outcome
            .target
            .clone()
            .unwrap_or_else(|| requested_url.to_string());
        let page_url = Url::parse(&final_url)?;

        let driver = Arc::clone(&self.driver);
        let html = match tokio::task::spawn_blocking(move || driver.page_source()).await {
            Ok(result) => result?,
            Err(error) => return Err(BrowserError::Dom(error.to_string()).into()),
        };

        let mut notifications = Vec::new();
        if outcome.redirected && outcome.internal {
            notifications.push(Notification::new(
                NotificationCategory::Redirect,
                format!("Page redirects to {}", final_url),
            ));
        }

        let telemetry = match self.telemetry.events() {
            Ok(events) => events,
            Err(error) => {
                tracing::warn!("Telemetry unavailable for {}: {}", final_url, error);
                Arc::from(Vec::new())
            }
        };
        notifications.extend(scan_external_resources(&telemetry, &page_url));

        let ctx = Arc::new(PageContext {
            page_url,
            html: Arc::from(html.as_str()),
            telemetry,
            config: Arc::clone(&self.config),
            http: self.http.clone(),
        });
        notifications.extend(run_scanners(ctx, self.config.max_workers).await);

        Ok(PageRecord {
            url: final_url,
            html,
            notifications,
            ttfb_ms: outcome.ttfb_ms,
            render_time_ms: outcome.render_time_ms,
        })
    }

    /// Extracts same-domain links from a finished page and enqueues the
    /// unseen ones at the next depth
    fn discover_links(
        &mut self,
        record: &PageRecord,
        frontier: &mut VecDeque<FrontierEntry>,
        next_depth: u32,
    ) {
        let base = match Url::parse(&record.url) {
            Ok(url) => url,
            Err(_) => self.seed.clone(),
        };

        let document = Html::parse_document(&record.html);
        let selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return,
        };

        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(href) => href.trim(),
                None => continue,
            };
            if href.is_empty() {
                continue;
            }

            let resolved = match Url::parse(href) {
                Ok(absolute) => absolute,
                Err(url::ParseError::RelativeUrlWithoutBase) => match base.join(href) {
                    Ok(absolute) => absolute,
                    Err(_) => continue,
                },
                Err(_) => continue,
            };

            let mut link = resolved;
            link.set_fragment(None);
            link.set_query(None);
            let link_str = link.to_string();

            if !is_same_domain(self.seed.as_str(), &link_str) {
                continue;
            }
            if !is_valid_url(&link_str, &self.config.ignored_extensions) {
                continue;
            }

            let normalized = normalize_url(&link_str);
            if self.visited.contains(&normalized) || self.queued.contains(&normalized) {
                continue;
            }

            self.queued.insert(normalized);
            frontier.push_back(FrontierEntry {
                url: link_str,
                depth: next_depth,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::FakeBrowser;

    #[test]
    fn test_seed_must_have_host() {
        let driver = Arc::new(FakeBrowser::new());
        let result = SiteCrawler::new(driver, "data:text/html,hi", AuditConfig::default());
        assert!(matches!(result, Err(CrawlError::SeedWithoutHost(_))));
    }

    #[test]
    fn test_unparseable_seed_rejected() {
        let driver = Arc::new(FakeBrowser::new());
        let result = SiteCrawler::new(driver, "not a url", AuditConfig::default());
        assert!(matches!(result, Err(CrawlError::UrlParse(_))));
    }

    #[test]
    fn test_fresh_crawler_has_no_visits() {
        let driver = Arc::new(FakeBrowser::new());
        let crawler =
            SiteCrawler::new(driver, "http://a.test/", AuditConfig::default()).unwrap();
        assert_eq!(crawler.visited_count(), 0);
    }
}
