//! Browser driver abstraction
//!
//! The crawl engine never reaches for a process-wide browser; it receives
//! an injected [`BrowserDriver`] capability and drives exactly one logical
//! session through it. This keeps navigation strictly sequential and lets
//! tests substitute a canned [`FakeBrowser`].

mod chrome;
pub mod fake;
pub mod telemetry;

pub use chrome::ChromeDriver;
pub use fake::{request_entry, response_entry, response_entry_with_headers, FakeBrowser, FakePage};
pub use telemetry::{NetworkEvent, TelemetryReader};

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by browser drivers
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("JavaScript execution failed: {0}")]
    Script(String),

    #[error("Page source unavailable: {0}")]
    Dom(String),

    #[error("Network log unavailable: {0}")]
    Log(String),
}

/// A controllable browser session
///
/// One instance corresponds to one stateful session: `current_url`,
/// `page_source`, and the network log all refer to the most recent
/// navigation. Methods block until the browser answers, so callers that
/// live on an async runtime bridge long operations through
/// `spawn_blocking`.
pub trait BrowserDriver: Send + Sync {
    /// Navigates the session to `url`, waiting up to `timeout` for the
    /// load to settle
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Returns the URL the session currently displays (post-redirect)
    fn current_url(&self) -> Result<String, BrowserError>;

    /// Returns the rendered HTML of the current page
    fn page_source(&self) -> Result<String, BrowserError>;

    /// Evaluates a JavaScript expression in the current page and returns
    /// its JSON value
    fn execute_script(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Removes and returns all buffered network log entries
    ///
    /// Each entry is a CDP-style performance log record: an object whose
    /// `message` field holds a JSON-encoded
    /// `{"message": {"method": ..., "params": ...}}` envelope.
    fn drain_network_log(&self) -> Result<Vec<serde_json::Value>, BrowserError>;
}
