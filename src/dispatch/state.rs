//! Scheduling state: per-account cooldowns and the replied-message set.
//!
//! Both structures are owned by the single dispatch task, so neither needs
//! interior mutability or locking.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Tracks when each account last replied and when it may act again.
#[derive(Debug)]
pub struct CooldownTracker {
    cooldown: Duration,
    last_reply: HashMap<String, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs as i64),
            last_reply: HashMap::new(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether `name` may act at `now`. Accounts that never replied are
    /// immediately eligible.
    pub fn is_eligible(&self, name: &str, now: DateTime<Utc>) -> bool {
        match self.last_reply.get(name) {
            None => true,
            Some(last) => now - *last >= self.cooldown,
        }
    }

    /// The instant `name` becomes eligible again, or `None` if it already
    /// is (never replied).
    pub fn next_eligible(&self, name: &str) -> Option<DateTime<Utc>> {
        self.last_reply.get(name).map(|last| *last + self.cooldown)
    }

    /// Record a successful reply at `at`.
    pub fn mark_replied(&mut self, name: &str, at: DateTime<Utc>) {
        self.last_reply.insert(name.to_string(), at);
    }
}

/// Message ids already answered, so no message is ever targeted twice.
/// Grows for the process lifetime; acceptable for a single run.
#[derive(Debug, Default)]
pub struct RepliedSet {
    replies: HashMap<String, DateTime<Utc>>,
}

impl RepliedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.replies.contains_key(message_id)
    }

    pub fn insert(&mut self, message_id: &str, at: DateTime<Utc>) {
        self.replies.insert(message_id.to_string(), at);
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_account_is_eligible() {
        let tracker = CooldownTracker::new(20);
        assert!(tracker.is_eligible("alpha", Utc::now()));
        assert_eq!(tracker.next_eligible("alpha"), None);
    }

    #[test]
    fn eligibility_follows_the_cooldown_boundary() {
        let mut tracker = CooldownTracker::new(20);
        let t0 = Utc::now();
        tracker.mark_replied("alpha", t0);

        assert!(!tracker.is_eligible("alpha", t0));
        assert!(!tracker.is_eligible("alpha", t0 + Duration::seconds(19)));
        assert!(tracker.is_eligible("alpha", t0 + Duration::seconds(20)));
        assert!(tracker.is_eligible("alpha", t0 + Duration::seconds(25)));
        assert_eq!(
            tracker.next_eligible("alpha"),
            Some(t0 + Duration::seconds(20))
        );
    }

    #[test]
    fn staggered_accounts_differ_in_eligibility() {
        // Cooldown 20s, alpha replied 25s ago, beta 5s ago: only alpha is
        // eligible.
        let mut tracker = CooldownTracker::new(20);
        let now = Utc::now();
        tracker.mark_replied("alpha", now - Duration::seconds(25));
        tracker.mark_replied("beta", now - Duration::seconds(5));

        assert!(tracker.is_eligible("alpha", now));
        assert!(!tracker.is_eligible("beta", now));
    }

    #[test]
    fn marking_again_pushes_eligibility_forward() {
        let mut tracker = CooldownTracker::new(10);
        let t0 = Utc::now();
        tracker.mark_replied("alpha", t0);
        let first = tracker.next_eligible("alpha").unwrap();

        tracker.mark_replied("alpha", t0 + Duration::seconds(30));
        let second = tracker.next_eligible("alpha").unwrap();
        assert!(second > first);
    }

    #[test]
    fn replied_set_remembers_ids() {
        let mut replied = RepliedSet::new();
        assert!(replied.is_empty());
        assert!(!replied.contains("m1"));

        replied.insert("m1", Utc::now());
        assert!(replied.contains("m1"));
        assert!(!replied.contains("m2"));
        assert_eq!(replied.len(), 1);
    }
}
