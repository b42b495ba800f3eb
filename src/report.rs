//! Page records and diagnostic notifications
//!
//! These are the crawl engine's output values: every processed page yields
//! one [`PageRecord`] carrying the notifications its scanners produced.

use std::fmt;

/// Category of a diagnostic notification
///
/// The set is closed so downstream consumers can handle every category
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    Redirect,
    ExternalResource,
    Accessibility,
    Seo,
    Error4xx,
    Error5xx,
    BrokenLink,
    LargeImage,
    Noindex,
    Nofollow,
    H1Missing,
    MultipleH1,
    NoHttps,
}

impl NotificationCategory {
    /// Stable string form used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::ExternalResource => "external_resource",
            Self::Accessibility => "accessibility",
            Self::Seo => "seo",
            Self::Error4xx => "error_4xx",
            Self::Error5xx => "error_5xx",
            Self::BrokenLink => "broken_link",
            Self::LargeImage => "large_image",
            Self::Noindex => "noindex",
            Self::Nofollow => "nofollow",
            Self::H1Missing => "h1_missing",
            Self::MultipleH1 => "multiple_h1",
            Self::NoHttps => "no_https",
        }
    }

    /// Parses the persisted string form back into a category
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "redirect" => Some(Self::Redirect),
            "external_resource" => Some(Self::ExternalResource),
            "accessibility" => Some(Self::Accessibility),
            "seo" => Some(Self::Seo),
            "error_4xx" => Some(Self::Error4xx),
            "error_5xx" => Some(Self::Error5xx),
            "broken_link" => Some(Self::BrokenLink),
            "large_image" => Some(Self::LargeImage),
            "noindex" => Some(Self::Noindex),
            "nofollow" => Some(Self::Nofollow),
            "h1_missing" => Some(Self::H1Missing),
            "multiple_h1" => Some(Self::MultipleH1),
            "no_https" => Some(Self::NoHttps),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic finding produced by a scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub category: NotificationCategory,
    pub message: String,
}

impl Notification {
    pub fn new(category: NotificationCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// The finished output for one crawled page
///
/// `url` is the post-redirect display form as reported by the browser.
/// Timing fields stay `None` when the telemetry needed to derive them was
/// unavailable.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub html: String,
    pub notifications: Vec<Notification>,
    pub ttfb_ms: Option<f64>,
    pub render_time_ms: Option<f64>,
}

impl PageRecord {
    /// Returns the notifications matching a category
    pub fn notifications_in(&self, category: NotificationCategory) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.category == category)
            .collect()
    }
}
