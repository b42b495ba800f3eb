//! Navigation control and redirect classification
//!
//! One navigation step: validate the URL, clear stale telemetry, drive the
//! browser with a bounded timeout, extract timing signals, and classify
//! where the browser actually landed relative to where it was sent.

use crate::browser::telemetry::{time_to_first_byte, TelemetryReader};
use crate::browser::BrowserDriver;
use crate::config::AuditConfig;
use crate::url::{is_same_domain, is_valid_url, normalize_url};
use std::sync::Arc;
use std::time::Instant;

const RENDER_TIME_SCRIPT: &str = "(function () { \
     var t = window.performance && window.performance.timing; \
     return t && t.domComplete > 0 ? t.domComplete - t.navigationStart : 0; \
     })()";

/// Why a navigation step decided not to proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The URL points at a non-page resource or unsupported scheme
    InvalidUrlType,
    /// The browser failed or timed out loading the page
    NavigationError,
    /// The browser was redirected off the requested domain
    ExternalRedirect,
}

/// Result of one navigation step
#[derive(Debug, Clone)]
pub struct NavigationOutcome {
    pub redirected: bool,
    /// True when a redirect stayed on the requested domain
    pub internal: bool,
    /// Final URL reported by the browser (unset when navigation was
    /// skipped before touching the browser)
    pub target: Option<String>,
    pub should_continue: bool,
    pub ttfb_ms: Option<f64>,
    pub render_time_ms: Option<f64>,
    pub skip_reason: Option<SkipReason>,
}

impl NavigationOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            redirected: false,
            internal: false,
            target: None,
            should_continue: false,
            ttfb_ms: None,
            render_time_ms: None,
            skip_reason: Some(reason),
        }
    }
}

/// Issues navigations against the injected browser session
pub struct Navigator {
    driver: Arc<dyn BrowserDriver>,
    config: Arc<AuditConfig>,
}

impl Navigator {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: Arc<AuditConfig>) -> Self {
        Self { driver, config }
    }

    /// Navigates to `url` and classifies the outcome
    ///
    /// The browser is never touched for URLs that fail the validity gate.
    /// Navigation failures are absorbed into a skip outcome so a single
    /// bad page never aborts the crawl.
    pub async fn navigate(&self, telemetry: &mut TelemetryReader, url: &str) -> NavigationOutcome {
        if !is_valid_url(url, &self.config.ignored_extensions) {
            return NavigationOutcome::skipped(SkipReason::InvalidUrlType);
        }

        // Telemetry is per-navigation; clear the previous page's events
        // before the browser starts loading.
        telemetry.invalidate();
        if let Err(error) = self.driver.drain_network_log() {
            tracing::debug!("Could not clear network log before {}: {}", url, error);
        }

        let started = Instant::now();
        let driver = Arc::clone(&self.driver);
        let target_url = url.to_string();
        let timeout = self.config.page_load_timeout();
        let navigated =
            tokio::task::spawn_blocking(move || driver.navigate(&target_url, timeout)).await;
        match navigated {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                tracing::warn!("Navigation failed for {}: {}", url, error);
                return NavigationOutcome::skipped(SkipReason::NavigationError);
            }
            Err(error) => {
                tracing::warn!("Navigation task failed for {}: {}", url, error);
                return NavigationOutcome::skipped(SkipReason::NavigationError);
            }
        }
        let wall_clock_ms = started.elapsed().as_secs_f64() * 1000.0;

        let final_url = match self.driver.current_url() {
            Ok(final_url) => final_url,
            Err(error) => {
                tracing::warn!("Could not read final URL after {}: {}", url, error);
                return NavigationOutcome::skipped(SkipReason::NavigationError);
            }
        };

        // Prefer the browser's own navigation timing over the wall clock.
        let render_time_ms = self
            .driver
            .execute_script(RENDER_TIME_SCRIPT)
            .ok()
            .and_then(|value| value.as_f64())
            .filter(|ms| *ms > 0.0)
            .or(Some(wall_clock_ms));

        let ttfb_ms = match telemetry.events() {
            Ok(events) => time_to_first_byte(&events, &final_url)
                .or_else(|| time_to_first_byte(&events, url)),
            Err(error) => {
                tracing::debug!("Telemetry unavailable for {}: {}", url, error);
                None
            }
        };

        let redirected = normalize_url(url) != normalize_url(&final_url);
        if redirected {
            if is_same_domain(url, &final_url) {
                NavigationOutcome {
                    redirected: true,
                    internal: true,
                    target: Some(final_url),
                    should_continue: true,
                    ttfb_ms,
                    render_time_ms,
                    skip_reason: None,
                }
            } else {
                NavigationOutcome {
                    redirected: true,
                    internal: false,
                    target: Some(final_url),
                    should_continue: false,
                    ttfb_ms,
                    render_time_ms,
                    skip_reason: Some(SkipReason::ExternalRedirect),
                }
            }
        } else {
            NavigationOutcome {
                redirected: false,
                internal: false,
                target: Some(final_url),
                should_continue: true,
                ttfb_ms,
                render_time_ms,
                skip_reason: None,
            }
        }
    }
}
