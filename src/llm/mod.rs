//! Reply generation against an OpenAI-compatible chat-completions backend.
//!
//! [`GenerationClient`] owns the credential pool and its rotation cursor.
//! The HTTP call itself sits behind the [`CompletionApi`] trait so failover
//! behavior is testable with scripted backends; the production
//! implementation lives in [`groq`].

pub mod groq;

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use secrecy::SecretString;

use crate::error::GenerateError;
use crate::sanitize::Sanitizer;

pub use groq::GroqCompletions;

/// System instruction pinning the reply voice: short, casual, never
/// AI-flavored.
const SYSTEM_PROMPT: &str = "You are a real human chatting on Discord.\n\
Never sound like AI.\n\
Keep replies short and natural.\n\
Maximum 1 or 2 short sentences.\n\
Do not tell long stories.\n\
Avoid structured explanations.\n\
Never use em-dash.\n\
Do not use roleplay actions like *laughs*.\n\
You may add ONE relevant emoji at the end if it fits naturally \
(e.g., \u{1F60A}, \u{1F914}, \u{1F4AF}, \u{1F680}, \u{1F525}, \u{1F440}, \u{1F64F}).\n\
Never force an emoji. If unsure, skip it.";

/// Style nudges, one mixed into each request so phrasing varies across
/// calls. Presentation variety only.
const STYLE_VARIATIONS: [&str; 5] = [
    "Reply like a normal Discord user.",
    "Reply casually like you're mid conversation.",
    "Reply naturally, not formal.",
    "Reply like you're actually interested.",
    "Reply short but human.",
];

/// Ordered credential pool with a persistent rotation cursor.
///
/// The cursor survives across calls for the process lifetime and always
/// indexes a valid slot. It only moves past keys that fail, so a key that
/// just worked is tried first on the next invocation.
#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<SecretString>,
    cursor: usize,
}

impl KeyPool {
    /// Build a pool from an ordered, non-empty key list. Emptiness is
    /// rejected at configuration load, before the pool exists.
    pub fn new(keys: Vec<SecretString>) -> Self {
        assert!(!keys.is_empty(), "key pool cannot be empty");
        Self { keys, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn current(&self) -> &SecretString {
        &self.keys[self.cursor]
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.keys.len();
    }
}

/// The raw completion call, one key at a time.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(
        &self,
        key: &SecretString,
        system: &str,
        user: &str,
    ) -> Result<String, GenerateError>;
}

/// Produces sanitized reply text, rotating through the key pool on failure.
pub struct GenerationClient {
    api: Box<dyn CompletionApi>,
    pool: KeyPool,
    sanitizer: Sanitizer,
}

impl GenerationClient {
    pub fn new(api: Box<dyn CompletionApi>, pool: KeyPool) -> Self {
        Self {
            api,
            pool,
            sanitizer: Sanitizer::new(),
        }
    }

    /// Current rotation cursor, for logging.
    pub fn cursor(&self) -> usize {
        self.pool.cursor()
    }

    /// Generate a sanitized reply to `prompt`.
    ///
    /// Tries each key in the pool at most once, advancing the cursor past
    /// failures. Success does not move the cursor, and the cursor is never
    /// reset between calls. An empty sanitized reply is valid output.
    pub async fn generate<R: Rng + ?Sized>(
        &mut self,
        prompt: &str,
        rng: &mut R,
    ) -> Result<String, GenerateError> {
        let style = STYLE_VARIATIONS
            .choose(rng)
            .copied()
            .unwrap_or(STYLE_VARIATIONS[0]);
        let user = format!("{style}\n\nMessage: {prompt}");

        let attempts = self.pool.len();
        for _ in 0..attempts {
            match self.api.complete(self.pool.current(), SYSTEM_PROMPT, &user).await {
                Ok(raw) => return Ok(self.sanitizer.clean(&raw)),
                Err(e) => {
                    tracing::debug!(
                        cursor = self.pool.cursor(),
                        error = %e,
                        "generation key failed, rotating"
                    );
                    self.pool.advance();
                }
            }
        }

        Err(GenerateError::Exhausted { attempts })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
