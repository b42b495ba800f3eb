//! Scanners over the network telemetry
//!
//! These checks read the parsed telemetry snapshot: failed resource
//! responses, oversized images, and requests leaving the page's domain.

use crate::browser::telemetry::NetworkEvent;
use crate::report::{Notification, NotificationCategory};
use crate::scan::PageContext;
use crate::url::is_same_domain;
use std::collections::HashSet;
use url::Url;

/// Flags every resource response with status >= 400
///
/// Deduplicates by (url, status) so a resource fetched twice with the same
/// failure reports once. 400-499 is `error_4xx`, 500 and above `error_5xx`.
pub(crate) fn scan_response_codes(ctx: &PageContext) -> Vec<Notification> {
    let mut seen: HashSet<(String, u16)> = HashSet::new();
    let mut notifications = Vec::new();

    for event in ctx.telemetry.iter() {
        if let NetworkEvent::Response(response) = event {
            if response.status < 400 {
                continue;
            }
            if !seen.insert((response.url.clone(), response.status)) {
                continue;
            }
            let category = if response.status >= 500 {
                NotificationCategory::Error5xx
            } else {
                NotificationCategory::Error4xx
            };
            notifications.push(Notification::new(
                category,
                format!("Resource returned HTTP {}: {}", response.status, response.url),
            ));
        }
    }

    notifications
}

/// Flags image responses whose encoded size exceeds the configured
/// threshold, reporting the size in KB to one decimal place
pub(crate) fn scan_large_images(ctx: &PageContext) -> Vec<Notification> {
    let threshold = ctx.config.large_image_threshold_bytes();
    let mut flagged: HashSet<String> = HashSet::new();
    let mut notifications = Vec::new();

    for event in ctx.telemetry.iter() {
        if let NetworkEvent::Response(response) = event {
            if !response.mime_type.starts_with("image/") {
                continue;
            }
            if response.encoded_data_length <= threshold {
                continue;
            }
            if !flagged.insert(response.url.clone()) {
                continue;
            }
            notifications.push(Notification::new(
                NotificationCategory::LargeImage,
                format!(
                    "Large image ({:.1} KB): {}",
                    response.encoded_data_length / 1024.0,
                    response.url
                ),
            ));
        }
    }

    notifications
}

/// Flags requests whose target lives outside the page's domain
///
/// `data:image`, `blob:`, and `data:text` URIs are inlined page content
/// rather than external fetches and are excluded. Results are
/// deduplicated by URL.
pub fn scan_external_resources(events: &[NetworkEvent], page_url: &Url) -> Vec<Notification> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut notifications = Vec::new();

    for event in events {
        if let NetworkEvent::Request(request) = event {
            let url = &request.url;
            if url.starts_with("data:image") || url.starts_with("blob:") || url.starts_with("data:text")
            {
                continue;
            }
            if is_same_domain(page_url.as_str(), url) {
                continue;
            }
            if seen.insert(url.clone()) {
                notifications.push(Notification::new(
                    NotificationCategory::ExternalResource,
                    url.clone(),
                ));
            }
        }
    }

    notifications
}
