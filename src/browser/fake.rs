//! Canned-page browser double for tests
//!
//! [`FakeBrowser`] implements [`BrowserDriver`] over a map of prepared
//! pages, letting the whole crawl engine run without a real browser. It
//! records every navigation so tests can assert on visit order, and its
//! entry builders produce raw log entries in the same CDP envelope shape a
//! real driver emits.

use crate::browser::{BrowserDriver, BrowserError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One prepared page the fake browser can serve
#[derive(Debug, Clone)]
pub struct FakePage {
    /// URL the browser reports after navigation (differs from the
    /// requested URL when simulating a redirect)
    pub final_url: String,
    pub html: String,
    /// Raw network log entries delivered for this navigation
    pub network_log: Vec<serde_json::Value>,
    /// Value returned for navigation-timing script evaluation
    pub render_time_ms: Option<f64>,
}

impl FakePage {
    pub fn new(final_url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            html: html.into(),
            network_log: Vec::new(),
            render_time_ms: None,
        }
    }

    pub fn with_log(mut self, network_log: Vec<serde_json::Value>) -> Self {
        self.network_log = network_log;
        self
    }

    pub fn with_render_time(mut self, render_time_ms: f64) -> Self {
        self.render_time_ms = Some(render_time_ms);
        self
    }
}

#[derive(Default)]
struct FakeState {
    current: Option<String>,
    log_buffer: Vec<serde_json::Value>,
    navigations: Vec<String>,
}

/// In-memory [`BrowserDriver`] backed by canned pages
pub struct FakeBrowser {
    pages: HashMap<String, FakePage>,
    state: Mutex<FakeState>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Registers a page under the URL the crawler will request
    pub fn with_page(mut self, requested_url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(requested_url.into(), page);
        self
    }

    /// Returns every URL navigated so far, in order
    pub fn navigations(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.navigations.clone())
            .unwrap_or_default()
    }

    fn current_page(&self) -> Result<&FakePage, BrowserError> {
        let state = self
            .state
            .lock()
            .map_err(|_| BrowserError::Dom("state poisoned".to_string()))?;
        let key = state
            .current
            .clone()
            .ok_or_else(|| BrowserError::Dom("no page loaded".to_string()))?;
        self.pages
            .get(&key)
            .ok_or_else(|| BrowserError::Dom(format!("no canned page for {}", key)))
    }
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserDriver for FakeBrowser {
    fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        let page = self
            .pages
            .get(url)
            .ok_or_else(|| BrowserError::Navigation(format!("no canned page for {}", url)))?;

        let mut state = self
            .state
            .lock()
            .map_err(|_| BrowserError::Navigation("state poisoned".to_string()))?;
        state.current = Some(url.to_string());
        state.log_buffer = page.network_log.clone();
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.current_page()?.final_url.clone())
    }

    fn page_source(&self) -> Result<String, BrowserError> {
        Ok(self.current_page()?.html.clone())
    }

    fn execute_script(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        if script.contains("domComplete") {
            let page = self.current_page()?;
            return Ok(match page.render_time_ms {
                Some(ms) => serde_json::json!(ms),
                None => serde_json::json!(0.0),
            });
        }
        Ok(serde_json::Value::Null)
    }

    fn drain_network_log(&self) -> Result<Vec<serde_json::Value>, BrowserError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BrowserError::Log("state poisoned".to_string()))?;
        Ok(std::mem::take(&mut state.log_buffer))
    }
}

/// Builds a raw `Network.requestWillBeSent` log entry
pub fn request_entry(url: &str, timestamp: f64) -> serde_json::Value {
    let message = serde_json::json!({
        "message": {
            "method": "Network.requestWillBeSent",
            "params": {
                "request": { "url": url },
                "timestamp": timestamp,
            }
        }
    });
    serde_json::json!({ "message": message.to_string() })
}

/// Builds a raw `Network.responseReceived` log entry
pub fn response_entry(
    url: &str,
    status: u16,
    mime_type: &str,
    encoded_data_length: f64,
    timestamp: f64,
) -> serde_json::Value {
    response_entry_with_headers(url, status, mime_type, encoded_data_length, &[], timestamp)
}

/// Builds a raw `Network.responseReceived` log entry with response headers
pub fn response_entry_with_headers(
    url: &str,
    status: u16,
    mime_type: &str,
    encoded_data_length: f64,
    headers: &[(&str, &str)],
    timestamp: f64,
) -> serde_json::Value {
    let header_map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(key, value)| (key.to_string(), serde_json::json!(value)))
        .collect();
    let message = serde_json::json!({
        "message": {
            "method": "Network.responseReceived",
            "params": {
                "response": {
                    "url": url,
                    "status": status,
                    "mimeType": mime_type,
                    "encodedDataLength": encoded_data_length,
                    "headers": header_map,
                },
                "timestamp": timestamp,
            }
        }
    });
    serde_json::json!({ "message": message.to_string() })
}
