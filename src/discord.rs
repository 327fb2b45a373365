use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DeliveryError;

const API_BASE: &str = "https://discord.com/api/v10";

#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send(&self, channel_id: &str, message: &str) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Posts through the Discord REST API with a bot token.
pub struct DiscordClient {
    client: reqwest::Client,
    token: String,
}

impl DiscordClient {
    pub fn new(token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", API_BASE, channel_id)
    }
}

#[async_trait]
impl Delivery for DiscordClient {
    async fn send(&self, channel_id: &str, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.messages_url(channel_id))
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(&CreateMessage { content: message })
            .send()
            .await
            .map_err(|source| DeliveryError::Request {
                channel: channel_id.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                channel: channel_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        debug!(channel_id, status = status.as_u16(), "message posted");
        Ok(())
    }
}

/// Logs messages instead of posting them.
pub struct DryRun;

#[async_trait]
impl Delivery for DryRun {
    async fn send(&self, channel_id: &str, message: &str) -> Result<(), DeliveryError> {
        info!(channel_id, "dry run, not posting:\n{}", message);
        Ok(())
    }
}
