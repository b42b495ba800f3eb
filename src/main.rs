//! Sitewarden main entry point
//!
//! Command-line interface for the Sitewarden site auditor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitewarden::browser::{BrowserDriver, ChromeDriver};
use sitewarden::config::{load_config, AuditConfig};
use sitewarden::crawler::SiteCrawler;
use sitewarden::service::{CrawlService, DriverFactory};
use sitewarden::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long an idle Chrome session is kept alive
const BROWSER_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Sitewarden: a browser-driven site auditor
///
/// Sitewarden crawls a site through a headless browser, runs diagnostic
/// scanners against every rendered page, and records the findings as
/// per-page notifications.
#[derive(Parser, Debug)]
#[command(name = "sitewarden")]
#[command(version)]
#[command(about = "Browser-driven site auditor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one site and print a summary of the findings
    Crawl {
        /// Seed URL; its host bounds the crawl
        url: String,

        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured crawl depth
        #[arg(long)]
        depth: Option<u32>,

        /// Persist results into this SQLite database
        #[arg(long)]
        database: Option<PathBuf>,

        /// Project the persisted results belong to
        #[arg(long, default_value_t = 0)]
        project_id: i64,
    },

    /// Enqueue a crawl job for the service loop
    Queue {
        /// Seed URL to crawl
        url: String,

        /// Path to the SQLite database holding the queue
        #[arg(long)]
        database: PathBuf,

        /// Project the job belongs to
        #[arg(long, default_value_t = 0)]
        project_id: i64,
    },

    /// Poll the job queue and crawl each queued site
    Serve {
        /// Path to the SQLite database holding the queue
        #[arg(long)]
        database: PathBuf,

        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds to sleep between queue polls
        #[arg(long, default_value_t = 5)]
        poll_interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl {
            url,
            config,
            depth,
            database,
            project_id,
        } => handle_crawl(&url, config.as_deref(), depth, database.as_deref(), project_id).await,
        Command::Queue {
            url,
            database,
            project_id,
        } => handle_queue(&url, &database, project_id),
        Command::Serve {
            database,
            config,
            poll_interval_secs,
        } => handle_serve(&database, config.as_deref(), poll_interval_secs).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewarden=info,warn"),
            1 => EnvFilter::new("sitewarden=debug,info"),
            2 => EnvFilter::new("sitewarden=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .init();
}

/// Loads the audit configuration, falling back to defaults when no file
/// is given
fn resolve_config(path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            load_config(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(AuditConfig::default()),
    }
}

async fn handle_crawl(
    url: &str,
    config_path: Option<&Path>,
    depth: Option<u32>,
    database: Option<&Path>,
    project_id: i64,
) -> anyhow::Result<()> {
    let mut config = resolve_config(config_path)?;
    if let Some(depth) = depth {
        config.max_crawl_depth = depth;
    }

    let driver = Arc::new(
        ChromeDriver::launch(BROWSER_IDLE_TIMEOUT).context("launching headless Chrome")?,
    );
    let mut crawler = SiteCrawler::new(driver, url, config)?;

    let storage = match database {
        Some(path) => {
            let storage = Arc::new(Mutex::new(SqliteStorage::new(path)?));
            let sink = Arc::clone(&storage);
            crawler.set_callback(move |record| {
                let mut storage = match sink.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if let Err(error) = storage.save_page(project_id, record) {
                    tracing::warn!("Failed to save page {}: {}", record.url, error);
                }
            });
            Some(storage)
        }
        None => None,
    };

    let pages = crawler.crawl().await?;

    println!("Crawled {} page(s) from {}", pages.len(), url);
    for page in &pages {
        println!("  {} ({} notification(s))", page.url, page.notifications.len());
        for notification in &page.notifications {
            println!("    [{}] {}", notification.category, notification.message);
        }
    }

    if storage.is_some() {
        println!("Results saved for project {}", project_id);
    }

    Ok(())
}

fn handle_queue(url: &str, database: &Path, project_id: i64) -> anyhow::Result<()> {
    let mut storage = SqliteStorage::new(database)?;
    let job_id = storage.enqueue_job(project_id, url)?;
    println!("Queued crawl job {} for project {}: {}", job_id, project_id, url);
    Ok(())
}

async fn handle_serve(
    database: &Path,
    config_path: Option<&Path>,
    poll_interval_secs: u64,
) -> anyhow::Result<()> {
    let config = resolve_config(config_path)?;
    let storage = Arc::new(Mutex::new(SqliteStorage::new(database)?));

    let factory: DriverFactory = Box::new(|| {
        ChromeDriver::launch(BROWSER_IDLE_TIMEOUT)
            .map(|driver| Arc::new(driver) as Arc<dyn BrowserDriver>)
    });

    let service = CrawlService::new(
        storage,
        config,
        factory,
        Duration::from_secs(poll_interval_secs),
    );
    service.run().await;
    Ok(())
}
