//! Crawl job service loop
//!
//! A polling worker over the persistent job queue: fetch the oldest
//! queued job, launch a browser session for it, crawl with a callback
//! that saves every finished page, and delete the job on success. A
//! failed job stays queued so a later poll retries it; only setup errors
//! inside a single job surface to the loop, where they are logged.

use crate::browser::{BrowserDriver, BrowserError};
use crate::config::AuditConfig;
use crate::crawler::SiteCrawler;
use crate::storage::{CrawlJob, SqliteStorage};
use crate::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Produces a fresh browser session for each job
pub type DriverFactory =
    Box<dyn Fn() -> std::result::Result<Arc<dyn BrowserDriver>, BrowserError> + Send + Sync>;

/// Polling worker that turns queued jobs into persisted crawl results
pub struct CrawlService {
    storage: Arc<Mutex<SqliteStorage>>,
    config: Arc<AuditConfig>,
    driver_factory: DriverFactory,
    poll_interval: Duration,
}

impl CrawlService {
    pub fn new(
        storage: Arc<Mutex<SqliteStorage>>,
        config: AuditConfig,
        driver_factory: DriverFactory,
        poll_interval: Duration,
    ) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            driver_factory,
            poll_interval,
        }
    }

    fn lock_storage(&self) -> MutexGuard<'_, SqliteStorage> {
        match self.storage.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Runs the service loop forever
    pub async fn run(&self) {
        tracing::info!("Starting crawl service");
        loop {
            match self.run_once().await {
                Ok(true) => {}
                Ok(false) => tracing::debug!("No jobs in queue, waiting"),
                Err(error) => tracing::error!("Error processing crawl job: {}", error),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Processes at most one queued job
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A job was processed and removed from the queue
    /// * `Ok(false)` - The queue was empty
    /// * `Err(CrawlError)` - The job failed; it stays queued for retry
    pub async fn run_once(&self) -> Result<bool> {
        let job = {
            let storage = self.lock_storage();
            storage.next_job()?
        };

        match job {
            Some(job) => {
                self.process_job(job).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn process_job(&self, job: CrawlJob) -> Result<()> {
        tracing::info!(
            "Processing crawl job {} for project {}: {}",
            job.queue_id,
            job.project_id,
            job.url
        );

        let driver = (self.driver_factory)()?;
        let mut crawler = SiteCrawler::new(driver, &job.url, (*self.config).clone())?;

        let storage = Arc::clone(&self.storage);
        let project_id = job.project_id;
        crawler.set_callback(move |record| {
            let mut storage = match storage.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Err(error) = storage.save_page(project_id, record) {
                tracing::warn!("Failed to save page {}: {}", record.url, error);
            }
        });

        let pages = crawler.crawl().await?;
        tracing::info!(
            "Completed crawl job {} with {} page record(s)",
            job.queue_id,
            pages.len()
        );

        let mut storage = self.lock_storage();
        storage.remove_job(job.queue_id)?;
        Ok(())
    }
}
