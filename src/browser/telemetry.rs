//! Network telemetry parsing and per-navigation caching
//!
//! The browser exposes its network activity as a noisy stream of raw
//! CDP-style log entries. This module parses that stream once per
//! navigation into typed [`NetworkEvent`] values and memoizes the result
//! so every scanner reads the same snapshot. Malformed entries are skipped
//! rather than failing the whole read.

use crate::browser::{BrowserDriver, BrowserError};
use crate::url::normalize_url;
use std::collections::HashMap;
use std::sync::Arc;

/// A request leaving the browser
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEvent {
    pub url: String,
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
}

/// A response arriving at the browser
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEvent {
    pub url: String,
    pub status: u16,
    pub mime_type: String,
    pub encoded_data_length: f64,
    pub headers: HashMap<String, String>,
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
}

/// A parsed network telemetry event
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Request(RequestEvent),
    Response(ResponseEvent),
}

/// Parses one raw performance-log entry into a [`NetworkEvent`]
///
/// Returns `None` for entries that are malformed or carry a method the
/// engine does not consume.
pub fn parse_log_entry(entry: &serde_json::Value) -> Option<NetworkEvent> {
    let raw = entry.get("message")?.as_str()?;
    let envelope: serde_json::Value = serde_json::from_str(raw).ok()?;
    let message = envelope.get("message")?;
    let method = message.get("method")?.as_str()?;
    let params = message.get("params")?;
    let timestamp = params
        .get("timestamp")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    match method {
        "Network.requestWillBeSent" => {
            let url = params.get("request")?.get("url")?.as_str()?.to_string();
            Some(NetworkEvent::Request(RequestEvent { url, timestamp }))
        }
        "Network.responseReceived" => {
            let response = params.get("response")?;
            let url = response.get("url")?.as_str()?.to_string();
            let status = response.get("status").and_then(|v| v.as_u64()).unwrap_or(0) as u16;
            let mime_type = response
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let encoded_data_length = response
                .get("encodedDataLength")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            let headers = response
                .get("headers")
                .and_then(|v| v.as_object())
                .map(|object| {
                    object
                        .iter()
                        .filter_map(|(key, value)| {
                            value.as_str().map(|s| (key.clone(), s.to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(NetworkEvent::Response(ResponseEvent {
                url,
                status,
                mime_type,
                encoded_data_length,
                headers,
                timestamp,
            }))
        }
        _ => None,
    }
}

/// Checks whether a telemetry URL refers to the given document URL
///
/// Browsers report the post-redirect URL, so an exact match is tried first
/// and a normalized comparison second.
pub fn urls_match(a: &str, b: &str) -> bool {
    a == b || normalize_url(a) == normalize_url(b)
}

/// Computes time-to-first-byte for the main document, in milliseconds
///
/// Correlates the request-sent timestamp for `document_url` with the first
/// response-received timestamp for the same URL. Returns `None` when no
/// matching pair exists in the telemetry.
pub fn time_to_first_byte(events: &[NetworkEvent], document_url: &str) -> Option<f64> {
    let sent = events.iter().find_map(|event| match event {
        NetworkEvent::Request(request) if urls_match(&request.url, document_url) => {
            Some(request.timestamp)
        }
        _ => None,
    })?;

    let received = events.iter().find_map(|event| match event {
        NetworkEvent::Response(response) if urls_match(&response.url, document_url) => {
            Some(response.timestamp)
        }
        _ => None,
    })?;

    Some((received - sent) * 1000.0)
}

/// Finds the response event for the main document
pub fn main_document_response<'a>(
    events: &'a [NetworkEvent],
    document_url: &str,
) -> Option<&'a ResponseEvent> {
    events.iter().find_map(|event| match event {
        NetworkEvent::Response(response) if urls_match(&response.url, document_url) => {
            Some(response)
        }
        _ => None,
    })
}

/// Case-insensitive header lookup
pub fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Memoizing reader over the browser's network log
///
/// The first `events()` call after a navigation drains the driver's log
/// buffer and caches the parsed events; later calls within the same page
/// return the cached snapshot. The cache must be invalidated at the start
/// of the next navigation so one page's telemetry never leaks into the
/// next.
pub struct TelemetryReader {
    driver: Arc<dyn BrowserDriver>,
    cache: Option<Arc<[NetworkEvent]>>,
}

impl TelemetryReader {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self {
            driver,
            cache: None,
        }
    }

    /// Clears the cached snapshot (navigation boundary)
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Returns the parsed telemetry for the current navigation
    pub fn events(&mut self) -> Result<Arc<[NetworkEvent]>, BrowserError> {
        if let Some(cached) = &self.cache {
            return Ok(Arc::clone(cached));
        }

        let raw = self.driver.drain_network_log()?;
        let parsed: Vec<NetworkEvent> = raw.iter().filter_map(parse_log_entry).collect();
        tracing::debug!(
            "Parsed {} of {} network log entries",
            parsed.len(),
            raw.len()
        );

        let events: Arc<[NetworkEvent]> = Arc::from(parsed);
        self.cache = Some(Arc::clone(&events));
        Ok(events)
    }
}
