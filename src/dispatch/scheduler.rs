//! The dispatch loop: pick an eligible account, pick a target message,
//! generate a reply, pace it like a human typing, send it.
//!
//! One cycle does at most one send. All network and generation work is
//! strictly sequential; the loop suspends at the cooldown wait, at each
//! request, and during the typing pace. Failures never abort the loop,
//! they just cost the cycle.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::channel::{ChannelMessage, ChannelTransport};
use crate::config::{Account, PoolConfig};
use crate::console::Pacer;
use crate::dispatch::state::{CooldownTracker, RepliedSet};
use crate::llm::GenerationClient;

/// How many recent messages to consider each cycle.
const FETCH_LIMIT: usize = 20;
/// Pause when the wait math said ready but the eligible set came up empty.
const IDLE_PAUSE: Duration = Duration::from_millis(500);
/// Pause when no fetched message qualifies as a target.
const NO_TARGET_PAUSE: Duration = Duration::from_secs(2);
/// Pause after a failed generation or send.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// What one pass through the loop did. Keeps the wait policy out of the
/// cycle itself and the transitions testable without sleeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every account is cooling down until at least this instant.
    AllCooling { until: DateTime<Utc> },
    /// No account was eligible once the set was actually filtered.
    NoneEligible,
    /// No qualifying target among the fetched messages.
    NoTarget,
    /// Every generation key failed for the chosen prompt.
    GenerationExhausted,
    /// The transport refused the reply; nothing was marked.
    SendFailed,
    /// A reply went out and state was updated.
    Replied { account: String, message_id: String },
}

/// Owns every piece of mutable scheduling state and runs the loop.
pub struct Dispatcher {
    accounts: Vec<Account>,
    self_ids: HashSet<String>,
    channel_id: String,
    guild_id: String,
    transport: Arc<dyn ChannelTransport>,
    generator: GenerationClient,
    cooldowns: CooldownTracker,
    replied: RepliedSet,
    pacer: Arc<dyn Pacer>,
    rng: StdRng,
}

impl Dispatcher {
    pub fn new(
        config: PoolConfig,
        transport: Arc<dyn ChannelTransport>,
        generator: GenerationClient,
        cooldown_secs: u64,
        pacer: Arc<dyn Pacer>,
        rng: StdRng,
    ) -> Self {
        let self_ids = config
            .accounts
            .iter()
            .map(|a| a.user_id.clone())
            .collect();
        Self {
            accounts: config.accounts,
            self_ids,
            channel_id: config.channel_id,
            guild_id: config.guild_id,
            transport,
            generator,
            cooldowns: CooldownTracker::new(cooldown_secs),
            replied: RepliedSet::new(),
            pacer,
            rng,
        }
    }

    /// Run forever. Each outcome decides the pause before the next cycle.
    pub async fn run(mut self) {
        loop {
            match self.run_cycle().await {
                CycleOutcome::AllCooling { until } => {
                    let wait = (until - Utc::now()).to_std().unwrap_or_default();
                    self.pacer.pace("Next action in", wait).await;
                }
                CycleOutcome::NoneEligible => {
                    self.pacer.pace("Idle", IDLE_PAUSE).await;
                }
                CycleOutcome::NoTarget => {
                    self.pacer.pace("No messages", NO_TARGET_PAUSE).await;
                }
                CycleOutcome::GenerationExhausted => {
                    self.pacer.pace("API retry", RETRY_PAUSE).await;
                }
                CycleOutcome::SendFailed => {
                    self.pacer.pace("Send failed", RETRY_PAUSE).await;
                }
                CycleOutcome::Replied { account, .. } => {
                    tracing::info!(
                        account = %account,
                        cooldown_secs = self.cooldowns.cooldown().num_seconds(),
                        "reply sent, account cooling down"
                    );
                }
            }
        }
    }

    /// One pass: wait math, account pick, target pick, generate, pace,
    /// send, state update.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let now = Utc::now();

        if let Some(until) = self.all_cooling_until(now) {
            return CycleOutcome::AllCooling { until };
        }

        let eligible: Vec<&Account> = self
            .accounts
            .iter()
            .filter(|a| self.cooldowns.is_eligible(&a.name, now))
            .collect();
        let Some(account) = eligible.choose(&mut self.rng).map(|a| (*a).clone()) else {
            return CycleOutcome::NoneEligible;
        };

        let messages = match self
            .transport
            .recent_messages(&account.token, &self.channel_id, FETCH_LIMIT)
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(account = %account.name, error = %e, "message fetch failed");
                Vec::new()
            }
        };

        let Some(target) = select_target(&messages, &self.replied, &self.self_ids).cloned()
        else {
            return CycleOutcome::NoTarget;
        };

        let reply = match self.generator.generate(&target.content, &mut self.rng).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                return CycleOutcome::GenerationExhausted;
            }
        };

        tracing::info!(account = %account.name, reply = %reply, "reply ready");

        if let Err(e) = self
            .transport
            .notify_typing(&account.token, &self.channel_id)
            .await
        {
            tracing::debug!(error = %e, "typing notification failed");
        }
        self.pacer.pace("Typing", typing_delay(&reply)).await;

        match self
            .transport
            .send_reply(
                &account.token,
                &self.channel_id,
                &self.guild_id,
                &reply,
                &target.id,
            )
            .await
        {
            Ok(()) => {
                let sent_at = Utc::now();
                self.cooldowns.mark_replied(&account.name, sent_at);
                self.replied.insert(&target.id, sent_at);
                CycleOutcome::Replied {
                    account: account.name,
                    message_id: target.id,
                }
            }
            Err(e) => {
                tracing::warn!(account = %account.name, error = %e, "send failed");
                CycleOutcome::SendFailed
            }
        }
    }

    /// If every account is still cooling down at `now`, the earliest
    /// instant one becomes eligible. `None` when someone is ready.
    fn all_cooling_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut earliest: Option<DateTime<Utc>> = None;
        for account in &self.accounts {
            match self.cooldowns.next_eligible(&account.name) {
                None => return None,
                Some(at) if at <= now => return None,
                Some(at) => earliest = Some(earliest.map_or(at, |e| e.min(at))),
            }
        }
        earliest
    }

    /// Replied-message count, for status reporting.
    pub fn replied_count(&self) -> usize {
        self.replied.len()
    }
}

/// Pick the target among fetched messages, in delivered order: drop empty
/// content, already-answered ids, and anything one of our own accounts
/// wrote. The first remaining message that mentions a pool account wins;
/// otherwise the first remaining message overall.
fn select_target<'a>(
    messages: &'a [ChannelMessage],
    replied: &RepliedSet,
    self_ids: &HashSet<String>,
) -> Option<&'a ChannelMessage> {
    let mut fallback = None;
    for message in messages {
        if message.content.is_empty() {
            continue;
        }
        if replied.contains(&message.id) {
            continue;
        }
        if self_ids.contains(&message.author.id) {
            continue;
        }
        if message.mentions_any(self_ids) {
            return Some(message);
        }
        if fallback.is_none() {
            fallback = Some(message);
        }
    }
    fallback
}

/// Synthetic typing time for a reply: a tenth of a second per character
/// plus a fifth per punctuation mark, floored at one second and rounded to
/// two decimals.
fn typing_delay(reply: &str) -> Duration {
    let chars = reply.chars().count() as f64;
    let punct = reply
        .chars()
        .filter(|c| matches!(c, '.' | ',' | '!' | '?'))
        .count() as f64;
    let secs = (chars * 0.1 + punct * 0.2).max(1.0);
    Duration::from_secs_f64((secs * 100.0).round() / 100.0)
}

// ── Tests ───────────────────────────────────────────────────────────
