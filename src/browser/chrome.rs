//! Headless-Chrome implementation of [`BrowserDriver`]
//!
//! Launches one hardened headless Chrome session, enables the CDP Network
//! domain, and buffers request/response events in the raw performance-log
//! envelope the telemetry reader consumes. The launch is the only fatal
//! failure; everything after it surfaces as a recoverable
//! [`BrowserError`].

use crate::browser::{BrowserDriver, BrowserError};
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Network;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// [`BrowserDriver`] backed by a headless Chrome/Chromium process
pub struct ChromeDriver {
    // Dropping the Browser kills the Chrome process, so it must outlive
    // the tab even though only the tab is used directly.
    _browser: Browser,
    tab: Arc<Tab>,
    events: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl ChromeDriver {
    /// Launches a headless Chrome session ready for crawling
    ///
    /// # Arguments
    ///
    /// * `idle_timeout` - How long the browser may sit idle before the
    ///   connection is considered dead
    ///
    /// # Returns
    ///
    /// * `Ok(ChromeDriver)` - Session launched and network capture armed
    /// * `Err(BrowserError)` - Chrome could not be launched or configured
    pub fn launch(idle_timeout: Duration) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .idle_browser_timeout(idle_timeout)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tab.call_method(Network::Enable {
            max_total_buffer_size: None,
            max_resource_buffer_size: None,
            max_post_data_size: None,
        })
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let events: Arc<Mutex<Vec<serde_json::Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Some(entry) = raw_log_entry(event) {
                if let Ok(mut buffer) = sink.lock() {
                    buffer.push(entry);
                }
            }
        }))
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tracing::info!("Headless Chrome session launched");

        Ok(Self {
            _browser: browser,
            tab,
            events,
        })
    }
}

/// Converts a CDP event into the raw performance-log envelope, mirroring
/// the shape Chrome's own performance log uses
fn raw_log_entry(event: &Event) -> Option<serde_json::Value> {
    let message = match event {
        Event::NetworkRequestWillBeSent(e) => serde_json::json!({
            "message": {
                "method": "Network.requestWillBeSent",
                "params": {
                    "request": { "url": &e.params.request.url },
                    "timestamp": e.params.timestamp,
                }
            }
        }),
        Event::NetworkResponseReceived(e) => serde_json::json!({
            "message": {
                "method": "Network.responseReceived",
                "params": {
                    "response": {
                        "url": &e.params.response.url,
                        "status": e.params.response.status,
                        "mimeType": &e.params.response.mime_type,
                        "encodedDataLength": e.params.response.encoded_data_length,
                        "headers": e.params.response.headers.0.clone()
                            .unwrap_or_else(|| serde_json::json!({})),
                    },
                    "timestamp": e.params.timestamp,
                }
            }
        }),
        _ => return None,
    };

    Some(serde_json::json!({ "message": message.to_string() }))
}

impl BrowserDriver for ChromeDriver {
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        Ok(())
    }

    fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.tab.get_url())
    }

    fn page_source(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::Dom(e.to_string()))
    }

    fn execute_script(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    fn drain_network_log(&self) -> Result<Vec<serde_json::Value>, BrowserError> {
        let mut buffer = self
            .events
            .lock()
            .map_err(|_| BrowserError::Log("event buffer poisoned".to_string()))?;
        Ok(std::mem::take(&mut buffer))
    }
}
