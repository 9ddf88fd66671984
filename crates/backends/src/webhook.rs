//! Human-notification client posting to an incoming webhook.
//!
//! The payload is the Slack-compatible `{"text": "..."}` shape, which
//! most chat-ops webhooks accept. Delivery failures are always reported
//! back as [`Error::Delivery`]; the caller decides how to surface them.

use std::time::Duration;

use sd_domain::config::NotifyConfig;
use sd_domain::error::{Error, Result};

use crate::traits::Notifier;
use crate::util::from_reqwest;

pub struct WebhookNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn from_config(cfg: &NotifyConfig, webhook_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            webhook_url,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let body = serde_json::json!({ "text": text });

        tracing::debug!(chars = text.len(), "posting escalation notification");

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Delivery(from_reqwest(e).to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let resp_text = resp.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!(
                "webhook HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        Ok(())
    }
}
