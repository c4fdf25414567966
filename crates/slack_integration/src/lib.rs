use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait ChannelNotifier: Send + Sync {
    async fn send(&self, channel: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    text: &'a str,
}

/// One webhook serves every channel; the target channel rides in the payload.
#[derive(Debug)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    webhook: Url,
}

impl WebhookNotifier {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let webhook = Url::parse(webhook_url)
            .with_context(|| format!("invalid slack webhook url: {webhook_url}"))?;
        Ok(Self {
            http: reqwest::Client::new(),
            webhook,
        })
    }
}

#[async_trait]
impl ChannelNotifier for WebhookNotifier {
    async fn send(&self, channel: &str, text: &str) -> Result<()> {
        debug!(channel, "posting message to webhook");
        self.http
            .post(self.webhook.clone())
            .json(&WebhookPayload { channel, text })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Stand-in when no webhook is configured; every send fails.
pub struct MissingNotifier;

#[async_trait]
impl ChannelNotifier for MissingNotifier {
    async fn send(&self, channel: &str, _text: &str) -> Result<()> {
        Err(anyhow!(
            "no slack webhook is configured, dropping message for #{channel}"
        ))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
