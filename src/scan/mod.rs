//! Diagnostic scanners for rendered pages
//!
//! Every scanner consumes the same immutable [`PageContext`] snapshot
//! (rendered DOM source plus parsed network telemetry) and produces zero
//! or more notifications. Scanners are idempotent, absorb their own
//! failures, and are safe to run concurrently because the snapshot is
//! fully built before any of them starts.

pub mod dom;
pub mod links;
pub mod network;
mod orchestrator;

pub use links::check_link;
pub use network::scan_external_resources;
pub use orchestrator::run_scanners;

use crate::browser::NetworkEvent;
use crate::config::AuditConfig;
use crate::report::Notification;
use std::sync::Arc;
use url::Url;

/// Immutable snapshot of one navigated page, shared by all scanners
pub struct PageContext {
    /// Final (post-redirect) URL of the page
    pub page_url: Url,
    /// Rendered HTML source
    pub html: Arc<str>,
    /// Parsed network telemetry for this navigation
    pub telemetry: Arc<[NetworkEvent]>,
    pub config: Arc<AuditConfig>,
    /// HTTP client used for link liveness probes
    pub http: reqwest::Client,
}

/// The fixed set of per-page diagnostic scanners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerKind {
    MissingAlt,
    Title,
    ResponseCodes,
    BrokenLinks,
    LargeImages,
    Indexability,
    Headings,
    Https,
}

impl ScannerKind {
    pub const ALL: [ScannerKind; 8] = [
        ScannerKind::MissingAlt,
        ScannerKind::Title,
        ScannerKind::ResponseCodes,
        ScannerKind::BrokenLinks,
        ScannerKind::LargeImages,
        ScannerKind::Indexability,
        ScannerKind::Headings,
        ScannerKind::Https,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingAlt => "missing-alt",
            Self::Title => "title",
            Self::ResponseCodes => "response-codes",
            Self::BrokenLinks => "broken-links",
            Self::LargeImages => "large-images",
            Self::Indexability => "indexability",
            Self::Headings => "headings",
            Self::Https => "https",
        }
    }

    /// Runs this scanner against a page snapshot
    pub async fn run(self, ctx: Arc<PageContext>) -> Vec<Notification> {
        match self {
            Self::MissingAlt => dom::scan_missing_alt(&ctx),
            Self::Title => dom::scan_title(&ctx),
            Self::ResponseCodes => network::scan_response_codes(&ctx),
            Self::BrokenLinks => links::scan_broken_links(&ctx).await,
            Self::LargeImages => network::scan_large_images(&ctx),
            Self::Indexability => dom::scan_indexability(&ctx),
            Self::Headings => dom::scan_headings(&ctx),
            Self::Https => dom::scan_https(&ctx),
        }
    }
}
