//! Scanners over the rendered DOM
//!
//! These checks parse the page-source snapshot with `scraper`; a selector
//! that fails to build or an element that cannot be read simply
//! contributes nothing, so a broken page never aborts the scan pass.

use crate::browser::telemetry::{header_value, main_document_response};
use crate::report::{Notification, NotificationCategory};
use crate::scan::PageContext;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Flags every image without non-blank alt text, plus a per-page summary
pub(crate) fn scan_missing_alt(ctx: &PageContext) -> Vec<Notification> {
    let document = Html::parse_document(&ctx.html);
    let selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut notifications = Vec::new();
    let mut missing = 0usize;

    for element in document.select(&selector) {
        let alt = element.value().attr("alt");
        if alt.map_or(true, |a| a.trim().is_empty()) {
            missing += 1;
            let src = element.value().attr("src").unwrap_or("unknown source");
            notifications.push(Notification::new(
                NotificationCategory::Accessibility,
                format!("Image missing alt text: {}", src),
            ));
        }
    }

    if missing > 0 {
        notifications.push(Notification::new(
            NotificationCategory::Accessibility,
            format!("Found {} image(s) missing alt text on this page", missing),
        ));
    }

    notifications
}

/// Flags a missing title or a title longer than the configured maximum
pub(crate) fn scan_title(ctx: &PageContext) -> Vec<Notification> {
    let document = Html::parse_document(&ctx.html);
    let selector = match Selector::parse("title") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let title = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    match title {
        Some(title) => {
            let length = title.chars().count();
            if length > ctx.config.max_title_length {
                vec![Notification::new(
                    NotificationCategory::Seo,
                    format!(
                        "Title length ({} characters) exceeds recommended maximum of {} characters: '{}'",
                        length, ctx.config.max_title_length, title
                    ),
                )]
            } else {
                Vec::new()
            }
        }
        None => vec![Notification::new(
            NotificationCategory::Seo,
            "Page is missing a title tag",
        )],
    }
}

/// Counts H1 headings: zero is missing, more than one lists the first
/// three texts
pub(crate) fn scan_headings(ctx: &PageContext) -> Vec<Notification> {
    let document = Html::parse_document(&ctx.html);
    let selector = match Selector::parse("h1") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let texts: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .collect();

    match texts.len() {
        0 => vec![Notification::new(
            NotificationCategory::H1Missing,
            "Page is missing an H1 heading",
        )],
        1 => Vec::new(),
        count => {
            let shown: Vec<String> = texts
                .iter()
                .take(3)
                .map(|text| format!("\"{}\"", text))
                .collect();
            let mut message = format!("Page has {} H1 headings: {}", count, shown.join(", "));
            if count > 3 {
                message.push_str(&format!(" and {} more", count - 3));
            }
            vec![Notification::new(NotificationCategory::MultipleH1, message)]
        }
    }
}

/// Flags pages whose final URL is served over plain HTTP
pub(crate) fn scan_https(ctx: &PageContext) -> Vec<Notification> {
    if ctx.page_url.scheme() == "http" {
        vec![Notification::new(
            NotificationCategory::NoHttps,
            format!("Page is served over HTTP instead of HTTPS: {}", ctx.page_url),
        )]
    } else {
        Vec::new()
    }
}

/// Inspects robots meta tags and the X-Robots-Tag header for
/// noindex/nofollow directives
///
/// Each directive generates one notification. The header is only
/// consulted for directives the meta tags did not already report, so the
/// same directive never signals twice.
pub(crate) fn scan_indexability(ctx: &PageContext) -> Vec<Notification> {
    let mut notifications = Vec::new();
    let mut seen: HashSet<&'static str> = HashSet::new();

    let document = Html::parse_document(&ctx.html);
    if let Ok(selector) = Selector::parse("meta[name][content]") {
        for element in document.select(&selector) {
            let name = element.value().attr("name").unwrap_or("");
            if !name.eq_ignore_ascii_case("robots") && !name.eq_ignore_ascii_case("googlebot") {
                continue;
            }
            let content = element
                .value()
                .attr("content")
                .unwrap_or("")
                .to_lowercase();
            if content.contains("noindex") && seen.insert("noindex") {
                notifications.push(Notification::new(
                    NotificationCategory::Noindex,
                    "Page has a noindex directive in its robots meta tag",
                ));
            }
            if content.contains("nofollow") && seen.insert("nofollow") {
                notifications.push(Notification::new(
                    NotificationCategory::Nofollow,
                    "Page has a nofollow directive in its robots meta tag",
                ));
            }
        }
    }

    if let Some(response) = main_document_response(&ctx.telemetry, ctx.page_url.as_str()) {
        if let Some(value) = header_value(&response.headers, "x-robots-tag") {
            let value = value.to_lowercase();
            if value.contains("noindex") && seen.insert("noindex") {
                notifications.push(Notification::new(
                    NotificationCategory::Noindex,
                    "Page has a noindex directive in the X-Robots-Tag response header",
                ));
            }
            if value.contains("nofollow") && seen.insert("nofollow") {
                notifications.push(Notification::new(
                    NotificationCategory::Nofollow,
                    "Page has a nofollow directive in the X-Robots-Tag response header",
                ));
            }
        }
    }

    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::response_entry_with_headers;
    use crate::browser::telemetry::parse_log_entry;
    use crate::scan::test_support::{context, context_at};

    #[test]
    fn test_missing_alt_per_image_and_summary() {
        let html = r#"<html><body>
            <img src="/a.png">
            <img src="/b.png" alt="  ">
            <img src="/c.png" alt="described">
        </body></html>"#;
        let notifications = scan_missing_alt(&context(html, vec![]));

        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications[0].message, "Image missing alt text: /a.png");
        assert_eq!(notifications[1].message, "Image missing alt text: /b.png");
        assert_eq!(
            notifications[2].message,
            "Found 2 image(s) missing alt text on this page"
        );
    }

    #[test]
    fn test_no_images_means_no_notifications() {
        let notifications = scan_missing_alt(&context("<html><body></body></html>", vec![]));
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_title_over_length() {
        let title = "a".repeat(61);
        let html = format!("<html><head><title>{}</title></head></html>", title);
        let notifications = scan_title(&context(&html, vec![]));

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::Seo);
        assert!(notifications[0].message.contains("61"));
        assert!(notifications[0].message.contains("60"));
        assert!(notifications[0].message.contains(&title));
    }

    #[test]
    fn test_title_at_limit_passes() {
        let html = format!("<html><head><title>{}</title></head></html>", "a".repeat(60));
        assert!(scan_title(&context(&html, vec![])).is_empty());
    }

    #[test]
    fn test_missing_title() {
        let notifications = scan_title(&context("<html><head></head></html>", vec![]));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "Page is missing a title tag");
    }

    #[test]
    fn test_empty_title_counts_as_missing() {
        let notifications = scan_title(&context("<html><head><title>  </title></head></html>", vec![]));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "Page is missing a title tag");
    }

    #[test]
    fn test_zero_h1() {
        let notifications = scan_headings(&context("<html><body><p>x</p></body></html>", vec![]));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::H1Missing);
    }

    #[test]
    fn test_single_h1_passes() {
        assert!(scan_headings(&context("<html><body><h1>One</h1></body></html>", vec![])).is_empty());
    }

    #[test]
    fn test_four_h1_lists_three_and_one_more() {
        let html = "<html><body><h1>A</h1><h1>B</h1><h1>C</h1><h1>D</h1></body></html>";
        let notifications = scan_headings(&context(html, vec![]));

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::MultipleH1);
        assert_eq!(
            notifications[0].message,
            "Page has 4 H1 headings: \"A\", \"B\", \"C\" and 1 more"
        );
    }

    #[test]
    fn test_two_h1_no_suffix() {
        let html = "<html><body><h1>A</h1><h1>B</h1></body></html>";
        let notifications = scan_headings(&context(html, vec![]));
        assert_eq!(
            notifications[0].message,
            "Page has 2 H1 headings: \"A\", \"B\""
        );
    }

    #[test]
    fn test_http_page_flagged() {
        let notifications = scan_https(&context_at("http://site.test/", "<html></html>", vec![]));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::NoHttps);
    }

    #[test]
    fn test_https_page_passes() {
        assert!(scan_https(&context_at("https://site.test/", "<html></html>", vec![])).is_empty());
    }

    #[test]
    fn test_meta_robots_noindex_nofollow() {
        let html = r#"<html><head>
            <meta name="ROBOTS" content="NOINDEX, NOFOLLOW">
        </head></html>"#;
        let notifications = scan_indexability(&context(html, vec![]));

        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].category, NotificationCategory::Noindex);
        assert_eq!(notifications[1].category, NotificationCategory::Nofollow);
    }

    #[test]
    fn test_googlebot_meta_counts() {
        let html = r#"<html><head><meta name="googlebot" content="noindex"></head></html>"#;
        let notifications = scan_indexability(&context(html, vec![]));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::Noindex);
    }

    #[test]
    fn test_header_directive_without_meta() {
        let entry = response_entry_with_headers(
            "http://site.test/",
            200,
            "text/html",
            100.0,
            &[("X-Robots-Tag", "noindex")],
            1.0,
        );
        let telemetry = vec![parse_log_entry(&entry).unwrap()];
        let notifications = scan_indexability(&context("<html></html>", telemetry));

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].category, NotificationCategory::Noindex);
        assert!(notifications[0].message.contains("X-Robots-Tag"));
    }

    #[test]
    fn test_header_does_not_duplicate_meta_directive() {
        let entry = response_entry_with_headers(
            "http://site.test/",
            200,
            "text/html",
            100.0,
            &[("x-robots-tag", "noindex, nofollow")],
            1.0,
        );
        let telemetry = vec![parse_log_entry(&entry).unwrap()];
        let html = r#"<html><head><meta name="robots" content="noindex"></head></html>"#;
        let notifications = scan_indexability(&context(html, telemetry));

        // noindex from the meta tag, nofollow only from the header
        assert_eq!(notifications.len(), 2);
        assert!(notifications[0].message.contains("meta tag"));
        assert_eq!(notifications[1].category, NotificationCategory::Nofollow);
        assert!(notifications[1].message.contains("X-Robots-Tag"));
    }
}
