//! Discord v9 REST transport.
//!
//! Plain REST calls with a user-account token, shaped like a desktop
//! browser session (user agent plus the base64 super-properties blob).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};

use crate::channel::{ChannelMessage, ChannelTransport};
use crate::error::TransportError;

const API_BASE: &str = "https://discord.com/api/v9";

/// Message fetch and send share one generous timeout.
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Typing is cosmetic, so it gets a shorter one.
const TYPING_TIMEOUT: Duration = Duration::from_secs(5);

/// REST client for the shared channel.
pub struct DiscordRest {
    client: reqwest::Client,
    super_properties: String,
}

impl DiscordRest {
    pub fn new() -> Self {
        let props = serde_json::json!({
            "os": "Windows",
            "browser": "Chrome",
            "system_locale": "en-US",
            "browser_user_agent": "Mozilla/5.0",
            "browser_version": "120.0.0.0",
            "os_version": "10",
            "release_channel": "stable",
            "client_build_number": 255289,
        });
        Self {
            client: reqwest::Client::new(),
            super_properties: base64::engine::general_purpose::STANDARD.encode(props.to_string()),
        }
    }

    fn messages_url(channel_id: &str, limit: usize) -> String {
        format!("{API_BASE}/channels/{channel_id}/messages?limit={limit}")
    }

    fn send_url(channel_id: &str) -> String {
        format!("{API_BASE}/channels/{channel_id}/messages")
    }

    fn typing_url(channel_id: &str) -> String {
        format!("{API_BASE}/channels/{channel_id}/typing")
    }

    fn with_headers(
        &self,
        request: reqwest::RequestBuilder,
        token: &SecretString,
    ) -> reqwest::RequestBuilder {
        request
            .header("Authorization", token.expose_secret())
            .header("User-Agent", "Mozilla/5.0")
            .header("X-Super-Properties", &self.super_properties)
            .header("Referer", "https://discord.com/channels/@me")
    }
}

impl Default for DiscordRest {
    fn default() -> Self {
        Self::new()
    }
}

/// Body for a threaded reply. The reply ping is suppressed so targets are
/// not notified twice (once for the mention, once for the reply).
fn reply_payload(
    channel_id: &str,
    guild_id: &str,
    text: &str,
    reply_to: &str,
) -> serde_json::Value {
    serde_json::json!({
        "content": text,
        "message_reference": {
            "channel_id": channel_id,
            "message_id": reply_to,
            "guild_id": guild_id,
        },
        "allowed_mentions": { "replied_user": false },
    })
}

#[async_trait]
impl ChannelTransport for DiscordRest {
    async fn recent_messages(
        &self,
        token: &SecretString,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, TransportError> {
        let url = Self::messages_url(channel_id, limit);
        let response = self
            .with_headers(self.client.get(&url), token)
            .timeout(MESSAGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: "messages".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                endpoint: "messages".to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Vec<ChannelMessage>>()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: "messages".to_string(),
                reason: format!("decode failed: {e}"),
            })
    }

    async fn send_reply(
        &self,
        token: &SecretString,
        channel_id: &str,
        guild_id: &str,
        text: &str,
        reply_to: &str,
    ) -> Result<(), TransportError> {
        let payload = reply_payload(channel_id, guild_id, text, reply_to);
        let response = self
            .with_headers(self.client.post(Self::send_url(channel_id)), token)
            .json(&payload)
            .timeout(MESSAGE_TIMEOUT)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: "send".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                endpoint: "send".to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn notify_typing(
        &self,
        token: &SecretString,
        channel_id: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .with_headers(self.client.post(Self::typing_url(channel_id)), token)
            .json(&serde_json::json!({}))
            .timeout(TYPING_TIMEOUT)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: "typing".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                endpoint: "typing".to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
