use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

/// Outbound one-way notification. Delivery failures are logged and swallowed;
/// nothing here may ever fail or delay a cycle.
#[async_trait]
pub trait Notify: Send + Sync {
    async fn notify(&self, message: &str);
}

/// POSTs `{"text": ...}` to a webhook. With no URL configured every call is a
/// no-op.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, url }
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn notify(&self, message: &str) {
        let Some(url) = &self.url else {
            debug!("no notify url configured, dropping: {message}");
            return;
        };
        match self
            .client
            .post(url)
            .json(&json!({ "text": message }))
            .send()
            .await
        {
            Ok(resp) if !resp.status().is_success() => {
                warn!("notification rejected with status {}", resp.status());
            }
            Ok(_) => debug!("notification delivered"),
            Err(e) => warn!("notification delivery failed: {e}"),
        }
    }
}
