//! Channel transport abstraction for message I/O.

pub mod discord;

use std::collections::HashSet;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::TransportError;

pub use discord::DiscordRest;

/// Author reference carried on fetched messages and mention lists.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
}

/// A message fetched from the shared channel. Transient: fetched fresh
/// each cycle, never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub author: MessageAuthor,
    #[serde(default)]
    pub mentions: Vec<MessageAuthor>,
}

impl ChannelMessage {
    /// Whether any of `ids` is mentioned by this message.
    pub fn mentions_any(&self, ids: &HashSet<String>) -> bool {
        self.mentions.iter().any(|m| ids.contains(&m.id))
    }
}

/// Transport seam between the dispatch loop and the chat service.
///
/// All methods take the acting account's token so each call goes out under
/// the identity whose turn it is. Errors are always recoverable; the
/// dispatch loop decides how to absorb them.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Fetch up to `limit` recent messages, most recent first as delivered.
    async fn recent_messages(
        &self,
        token: &SecretString,
        channel_id: &str,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, TransportError>;

    /// Send `text` as a threaded reply to `reply_to`.
    async fn send_reply(
        &self,
        token: &SecretString,
        channel_id: &str,
        guild_id: &str,
        text: &str,
        reply_to: &str,
    ) -> Result<(), TransportError>;

    /// Fire the typing indicator. Best-effort; callers ignore failures.
    async fn notify_typing(
        &self,
        token: &SecretString,
        channel_id: &str,
    ) -> Result<(), TransportError>;
}

// ── Tests ───────────────────────────────────────────────────────────
