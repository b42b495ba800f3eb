//! Integration tests for the crawl engine
//!
//! These tests drive the full crawl cycle end-to-end against a canned
//! browser double: breadth-first emission order, duplicate suppression,
//! domain containment, depth limiting, and redirect handling.

use sitewarden::browser::{request_entry, response_entry, FakeBrowser, FakePage};
use sitewarden::config::AuditConfig;
use sitewarden::crawler::SiteCrawler;
use sitewarden::report::NotificationCategory;
use std::sync::{Arc, Mutex};

/// Configuration tuned for fast tests: probe timeouts of one second and
/// the default depth of one hop
fn test_config() -> AuditConfig {
    AuditConfig {
        link_probe_timeout_secs: 1,
        ..AuditConfig::default()
    }
}

fn page_html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>", href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>",
        title, title, anchors
    )
}

#[tokio::test]
async fn test_end_to_end_crawl_with_external_resource() {
    let seed_log = vec![
        request_entry("http://a.test/", 10.0),
        response_entry("http://a.test/", 200, "text/html", 2048.0, 10.2),
        request_entry("http://cdn.test/x.png", 10.3),
        response_entry("http://cdn.test/x.png", 200, "image/png", 1024.0, 10.4),
    ];
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page(
                "http://a.test/",
                FakePage::new("http://a.test/", page_html("Home", &["http://a.test/b"]))
                    .with_log(seed_log)
                    .with_render_time(640.0),
            )
            .with_page(
                "http://a.test/b",
                FakePage::new("http://a.test/b", page_html("B", &["http://a.test/c"])),
            ),
    );

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();

    let emitted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&emitted);
    crawler.set_callback(move |record| {
        sink.lock().unwrap().push(record.url.clone());
    });

    let pages = crawler.crawl().await.unwrap();

    // Two records, breadth-first: the seed page then its child. The child
    // links onward to /c, but that would need a second hop.
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].url, "http://a.test/");
    assert_eq!(pages[1].url, "http://a.test/b");
    assert_eq!(
        driver.navigations(),
        vec!["http://a.test/".to_string(), "http://a.test/b".to_string()]
    );

    // The callback saw the same pages in the same order.
    assert_eq!(
        *emitted.lock().unwrap(),
        vec!["http://a.test/".to_string(), "http://a.test/b".to_string()]
    );

    // The seed page flagged the CDN fetch as an external resource.
    let external = pages[0].notifications_in(NotificationCategory::ExternalResource);
    assert_eq!(external.len(), 1);
    assert_eq!(external[0].message, "http://cdn.test/x.png");

    // Timing came from the canned telemetry and navigation timing.
    let ttfb = pages[0].ttfb_ms.unwrap();
    assert!((ttfb - 200.0).abs() < 1e-6);
    assert_eq!(pages[0].render_time_ms, Some(640.0));
}

#[tokio::test]
async fn test_no_duplicate_visits_across_url_variants() {
    let html = page_html(
        "Home",
        &[
            "http://a.test/b",
            "http://a.test/b#section",
            "http://a.test/b?utm=1",
            "http://a.test/",
            "http://A.TEST/b",
        ],
    );
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page("http://a.test/", FakePage::new("http://a.test/", html))
            .with_page(
                "http://a.test/b",
                FakePage::new("http://a.test/b", page_html("B", &[])),
            ),
    );

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();
    let pages = crawler.crawl().await.unwrap();

    // Fragment, query, and case variants all collapse onto one visit, and
    // the seed itself is never revisited.
    assert_eq!(pages.len(), 2);
    assert_eq!(
        driver.navigations(),
        vec!["http://a.test/".to_string(), "http://a.test/b".to_string()]
    );
}

#[tokio::test]
async fn test_domain_containment() {
    let html = page_html(
        "Home",
        &[
            "http://other.test/page",
            "http://sub.a.test/page",
            "http://a.test/inside",
        ],
    );
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page("http://a.test/", FakePage::new("http://a.test/", html))
            .with_page(
                "http://a.test/inside",
                FakePage::new("http://a.test/inside", page_html("Inside", &[])),
            ),
    );

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();
    crawler.crawl().await.unwrap();

    for navigated in driver.navigations() {
        let host = url::Url::parse(&navigated).unwrap().host_str().unwrap().to_string();
        assert_eq!(host, "a.test", "navigated outside the seed domain: {}", navigated);
    }
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page(
                "http://a.test/",
                FakePage::new("http://a.test/", page_html("Home", &["http://a.test/b"])),
            )
            .with_page(
                "http://a.test/b",
                FakePage::new("http://a.test/b", page_html("B", &["http://a.test/c"])),
            )
            .with_page(
                "http://a.test/c",
                FakePage::new("http://a.test/c", page_html("C", &[])),
            ),
    );

    let config = AuditConfig {
        max_crawl_depth: 1,
        link_probe_timeout_secs: 1,
        ..AuditConfig::default()
    };
    let mut crawler = SiteCrawler::new(driver.clone(), "http://a.test/", config).unwrap();
    let pages = crawler.crawl().await.unwrap();

    assert_eq!(pages.len(), 2);
    assert!(!driver
        .navigations()
        .contains(&"http://a.test/c".to_string()));
}

#[tokio::test]
async fn test_depth_zero_crawls_only_the_seed() {
    let driver = Arc::new(FakeBrowser::new().with_page(
        "http://a.test/",
        FakePage::new("http://a.test/", page_html("Home", &["http://a.test/b"])),
    ));

    let config = AuditConfig {
        max_crawl_depth: 0,
        link_probe_timeout_secs: 1,
        ..AuditConfig::default()
    };
    let mut crawler = SiteCrawler::new(driver.clone(), "http://a.test/", config).unwrap();
    let pages = crawler.crawl().await.unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(driver.navigations(), vec!["http://a.test/".to_string()]);
}

#[tokio::test]
async fn test_non_page_links_are_never_navigated() {
    let html = page_html(
        "Home",
        &[
            "http://a.test/report.pdf",
            "http://a.test/app.js",
            "http://a.test/styles.css",
            "http://a.test/real",
        ],
    );
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page("http://a.test/", FakePage::new("http://a.test/", html))
            .with_page(
                "http://a.test/real",
                FakePage::new("http://a.test/real", page_html("Real", &[])),
            ),
    );

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();
    crawler.crawl().await.unwrap();

    assert_eq!(
        driver.navigations(),
        vec!["http://a.test/".to_string(), "http://a.test/real".to_string()]
    );
}

#[tokio::test]
async fn test_internal_redirect_produces_notification() {
    let driver = Arc::new(FakeBrowser::new().with_page(
        "http://a.test/B",
        FakePage::new("http://a.test/b/", page_html("Landed", &[])),
    ));

    let mut crawler =
        SiteCrawler::new(driver, "http://a.test/B", test_config()).unwrap();
    let pages = crawler.crawl().await.unwrap();

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, "http://a.test/b/");

    let redirects = pages[0].notifications_in(NotificationCategory::Redirect);
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].message, "Page redirects to http://a.test/b/");
}

#[tokio::test]
async fn test_external_redirect_yields_no_record() {
    let driver = Arc::new(FakeBrowser::new().with_page(
        "http://a.test/",
        FakePage::new("http://gone.test/elsewhere", page_html("Elsewhere", &[])),
    ));

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();
    let pages = crawler.crawl().await.unwrap();

    // The URL counts as visited but the external landing page is neither
    // recorded nor analyzed.
    assert!(pages.is_empty());
    assert_eq!(crawler.visited_count(), 1);
    assert_eq!(driver.navigations(), vec!["http://a.test/".to_string()]);
}

#[tokio::test]
async fn test_navigation_failure_skips_page_and_continues() {
    // The seed links to two pages; only one of them is served.
    let html = page_html("Home", &["http://a.test/missing", "http://a.test/ok"]);
    let driver = Arc::new(
        FakeBrowser::new()
            .with_page("http://a.test/", FakePage::new("http://a.test/", html))
            .with_page(
                "http://a.test/ok",
                FakePage::new("http://a.test/ok", page_html("Ok", &[])),
            ),
    );

    let mut crawler =
        SiteCrawler::new(driver.clone(), "http://a.test/", test_config()).unwrap();
    let pages = crawler.crawl().await.unwrap();

    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec!["http://a.test/", "http://a.test/ok"]);
}

#[tokio::test]
async fn test_scanner_findings_reach_the_page_record() {
    let html = r#"<html><head></head><body>
        <img src="/logo.png">
    </body></html>"#;
    let log = vec![
        request_entry("http://a.test/", 1.0),
        response_entry("http://a.test/", 200, "text/html", 512.0, 1.1),
        response_entry("http://a.test/big.png", 200, "image/png", 600_000.0, 1.2),
        response_entry("http://a.test/gone.css", 404, "text/css", 10.0, 1.3),
    ];
    let driver = Arc::new(FakeBrowser::new().with_page(
        "http://a.test/",
        FakePage::new("http://a.test/", html).with_log(log),
    ));

    let config = AuditConfig {
        max_crawl_depth: 0,
        link_probe_timeout_secs: 1,
        ..AuditConfig::default()
    };
    let mut crawler = SiteCrawler::new(driver, "http://a.test/", config).unwrap();
    let pages = crawler.crawl().await.unwrap();
    let page = &pages[0];

    assert_eq!(page.notifications_in(NotificationCategory::Seo).len(), 1);
    assert_eq!(
        page.notifications_in(NotificationCategory::H1Missing).len(),
        1
    );
    assert_eq!(
        page.notifications_in(NotificationCategory::Accessibility).len(),
        2
    );
    assert_eq!(
        page.notifications_in(NotificationCategory::LargeImage).len(),
        1
    );
    assert_eq!(
        page.notifications_in(NotificationCategory::Error4xx).len(),
        1
    );
    assert_eq!(
        page.notifications_in(NotificationCategory::NoHttps).len(),
        1
    );
}
