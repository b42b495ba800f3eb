//! Link liveness checking
//!
//! The broken-link scanner collects every probe-worthy anchor from the
//! rendered DOM, then fans out lightweight HEAD requests under its own
//! bounded worker pool. This is the only network I/O that happens outside
//! the browser session, so each probe is safe to run concurrently.

use crate::report::{Notification, NotificationCategory};
use crate::scan::PageContext;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Checks one link's liveness with a HEAD request
///
/// A status of 400 or above yields a `broken_link` notification carrying
/// "Status: <code>"; a connection failure or timeout yields one carrying
/// "Error: Connection failed". Healthy links yield `None`.
pub async fn check_link(
    client: &reqwest::Client,
    href: &str,
    display_text: &str,
    timeout: Duration,
) -> Option<Notification> {
    let text = truncate_display_text(display_text);

    match client.head(href).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if status >= 400 {
                Some(Notification::new(
                    NotificationCategory::BrokenLink,
                    format!("Broken link '{}' ({}) - Status: {}", text, href, status),
                ))
            } else {
                None
            }
        }
        Err(error) => {
            tracing::debug!("Link probe failed for {}: {}", href, error);
            Some(Notification::new(
                NotificationCategory::BrokenLink,
                format!("Broken link '{}' ({}) - Error: Connection failed", text, href),
            ))
        }
    }
}

/// Probes every collected link and reports the broken ones in page order
pub(crate) async fn scan_broken_links(ctx: &PageContext) -> Vec<Notification> {
    let links = collect_probe_links(&ctx.html, &ctx.page_url);
    if links.is_empty() {
        return Vec::new();
    }

    let limit = ctx.config.max_workers.clamp(1, links.len());
    let semaphore = Arc::new(Semaphore::new(limit));
    let timeout = ctx.config.link_probe_timeout();

    let mut handles = Vec::with_capacity(links.len());
    for (href, text) in links {
        let client = ctx.http.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            check_link(&client, &href, &text, timeout).await
        }));
    }

    let mut notifications = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Some(notification)) => notifications.push(notification),
            Ok(None) => {}
            Err(error) => tracing::warn!("Link probe task aborted: {}", error),
        }
    }
    notifications
}

/// Collects (absolute href, display text) pairs worth probing
///
/// Skipped: empty hrefs, bare fragments, `javascript:` pseudo-links, and
/// any scheme-qualified link that is not http(s) (mailto, tel, ftp,
/// skype, sms, whatsapp, ...). Relative hrefs are resolved against the
/// page URL.
pub(crate) fn collect_probe_links(html: &str, page_url: &Url) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let resolved = match Url::parse(href) {
            Ok(absolute) => {
                if !matches!(absolute.scheme(), "http" | "https") {
                    continue;
                }
                absolute
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => match page_url.join(href) {
                Ok(absolute) => absolute,
                Err(_) => continue,
            },
            Err(_) => continue,
        };

        let text = element.text().collect::<String>().trim().to_string();
        links.push((resolved.to_string(), text));
    }
    links
}

/// Truncates link text to 27 characters plus an ellipsis when it exceeds
/// 30 characters
fn truncate_display_text(text: &str) -> String {
    if text.chars().count() > 30 {
        let truncated: String = text.chars().take(27).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
