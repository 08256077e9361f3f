///! Webhook notification sink
///!
///! Dispatches composed notifications to one preconfigured chat webhook as
///! an embed payload. The sink must verify itself before the scheduler arms
///! any job; verification failure at startup is the one fatal error in the
///! process.

use super::message::Notification;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("sink rejected message: HTTP {0}")]
    Rejected(reqwest::StatusCode),
}

/// Outbound notification channel.
#[async_trait]
pub trait NotifySink: Send + Sync {
    /// Confirm the destination is resolvable and accepting messages.
    async fn verify(&self) -> Result<(), SinkError>;

    /// Dispatch one notification to the preconfigured destination.
    async fn send(&self, notification: &Notification) -> Result<(), SinkError>;
}

pub struct WebhookSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookSink {
    pub fn new(webhook_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl NotifySink for WebhookSink {
    async fn verify(&self) -> Result<(), SinkError> {
        let response = self.client.get(&self.webhook_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status));
        }

        tracing::info!("Notification sink verified, destination is ready");
        Ok(())
    }

    async fn send(&self, notification: &Notification) -> Result<(), SinkError> {
        let payload = json!({ "embeds": [embed_json(notification)] });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<Failed to read body>".to_string());
            tracing::error!("Sink rejected notification. Status: {}, Response: {}", status, body);
            return Err(SinkError::Rejected(status));
        }

        tracing::debug!("Notification delivered. Status: {}", status);
        Ok(())
    }
}

/// Serialize a notification into the webhook's embed object, leaving unset
/// optional keys out entirely.
pub fn embed_json(notification: &Notification) -> Value {
    let mut embed = Map::new();
    embed.insert("title".to_string(), json!(notification.title));

    if let Some(url) = &notification.url {
        embed.insert("url".to_string(), json!(url));
    }
    if let Some(description) = &notification.description {
        embed.insert("description".to_string(), json!(description));
    }
    if let Some(color) = notification.color {
        embed.insert("color".to_string(), json!(color));
    }

    let fields: Vec<Value> = notification
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "value": field.value,
                "inline": field.inline,
            })
        })
        .collect();
    embed.insert("fields".to_string(), json!(fields));

    if let Some(footer) = &notification.footer {
        embed.insert("footer".to_string(), json!({ "text": footer }));
    }

    Value::Object(embed)
}

#[cfg(test)]
mod tests {
    use super::super::NotificationField;
    use super::*;

    #[test]
    fn test_embed_json_full() {
        let notification = Notification {
            title: "🛰️ Satellite: ISS".to_string(),
            url: Some("https://www.n2yo.com/satellite/?s=25544".to_string()),
            description: Some("2026-08-06 12:00:00".to_string()),
            color: Some(0x3498db),
            fields: vec![NotificationField {
                name: "🌍 NORAD ID".to_string(),
                value: "25544".to_string(),
                inline: true,
            }],
            footer: Some("N2YO Transactions: 5/1000".to_string()),
        };

        let embed = embed_json(&notification);
        assert_eq!(embed["title"], "🛰️ Satellite: ISS");
        assert_eq!(embed["color"], 0x3498db);
        assert_eq!(embed["fields"][0]["inline"], true);
        assert_eq!(embed["footer"]["text"], "N2YO Transactions: 5/1000");
    }

    #[test]
    fn test_embed_json_omits_unset_keys() {
        let notification = Notification {
            title: "📊 Daily Satellite Report 📊".to_string(),
            url: None,
            description: None,
            color: None,
            fields: Vec::new(),
            footer: None,
        };

        let embed = embed_json(&notification);
        let keys = embed.as_object().expect("embed is an object");
        assert!(!keys.contains_key("url"));
        assert!(!keys.contains_key("color"));
        assert!(!keys.contains_key("footer"));
        assert_eq!(embed["fields"].as_array().map(Vec::len), Some(0));
    }
}
