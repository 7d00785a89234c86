//! Reply text cleanup.
//!
//! Raw completions arrive with habits that read as obviously synthetic in a
//! busy channel: em-dashes, `*roleplay asterisks*`, a leading "yeah," on
//! half the lines, trailing periods. [`Sanitizer`] rewrites a completion
//! into something that passes as a quickly typed chat message and caps it
//! at a length that fits the room.

use regex::Regex;

/// Hard cap on outgoing reply length, in characters.
const MAX_REPLY_CHARS: usize = 90;

/// Normalizes generated text into a sendable reply.
///
/// The cleanup pass applies, in order: dash removal, stage-direction
/// removal, whitespace collapse, leading-filler strip, exclamation
/// softening, trailing-period strip, comma-before-emoji spacing, a final
/// collapse, and word-boundary truncation. [`Sanitizer::clean`] repeats the
/// pass until the text stops changing, so cleaning is idempotent.
pub struct Sanitizer {
    stage_direction: Regex,
    whitespace: Regex,
    leading_filler: Regex,
    bang_break: Regex,
    trailing_period: Regex,
    comma_before_emoji: Regex,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            stage_direction: Regex::new(r"\*[^*]+\*").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
            leading_filler: Regex::new(r"(?i)^\s*yeah\s*[,.]?\s*").unwrap(),
            bang_break: Regex::new(r"(\w)!\s+").unwrap(),
            trailing_period: Regex::new(r"\.\s*$").unwrap(),
            comma_before_emoji: Regex::new(r",\s*([\x{1F600}-\x{1F64F}])").unwrap(),
        }
    }

    /// Clean `text` to a fixpoint. The result is always trimmed, at most
    /// [`MAX_REPLY_CHARS`] characters, and may be empty. An empty result is
    /// a valid (if degenerate) reply, not a failure.
    pub fn clean(&self, text: &str) -> String {
        // Each pass never lengthens the text and strictly reduces either
        // its length, its '!' count, or its comma-before-emoji count, so
        // this terminates.
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// One cleanup pass, order-sensitive.
    fn pass(&self, text: &str) -> String {
        let no_dashes: String = text
            .chars()
            .filter(|c| !matches!(c, '\u{2013}' | '\u{2014}'))
            .collect();
        let text = self.stage_direction.replace_all(&no_dashes, "");
        let text = self.whitespace.replace_all(&text, " ");
        let text = text.trim().to_string();
        let text = self.leading_filler.replace(&text, "");
        let text = self.bang_break.replace_all(&text, "${1}, ");
        let text = self.trailing_period.replace(&text, "");
        let text = self.comma_before_emoji.replace_all(&text, " ${1}");
        let text = self.whitespace.replace_all(&text, " ");
        truncate_words(text.trim(), MAX_REPLY_CHARS)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cap `text` at `max_chars` characters without splitting a word: keep the
/// prefix up to the last space inside the limit and drop the rest. Text
/// with no space inside the limit truncates to empty.
fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    match prefix.rfind(' ') {
        Some(cut) => prefix[..cut].trim_end().to_string(),
        None => String::new(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        Sanitizer::new().clean(text)
    }

    #[test]
    fn strips_dashes() {
        assert_eq!(clean("one\u{2014}two\u{2013}three"), "onetwothree");
    }

    #[test]
    fn removes_stage_directions() {
        assert_eq!(clean("*laughs* sounds good"), "sounds good");
        assert_eq!(clean("sure *nods slowly* why not"), "sure why not");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean("  too\t many\n\nspaces  "), "too many spaces");
    }

    #[test]
    fn strips_leading_filler() {
        assert_eq!(clean("Yeah, sounds right"), "sounds right");
        assert_eq!(clean("yeah. sounds right"), "sounds right");
        assert_eq!(clean("YEAH sounds right"), "sounds right");
    }

    #[test]
    fn filler_only_stripped_at_start() {
        assert_eq!(clean("well yeah, sounds right"), "well yeah, sounds right");
    }

    #[test]
    fn softens_mid_sentence_exclamations() {
        assert_eq!(clean("wow! that worked"), "wow, that worked");
    }

    #[test]
    fn trailing_exclamation_is_kept() {
        // The softening rule needs whitespace after the mark, so a final
        // "!" survives.
        assert_eq!(clean("that worked!"), "that worked!");
    }

    #[test]
    fn strips_trailing_periods() {
        assert_eq!(clean("done."), "done");
        // Repeated periods drain across passes.
        assert_eq!(clean("done.."), "done");
    }

    #[test]
    fn spaces_emoji_after_comma() {
        assert_eq!(clean("nice,\u{1F60A}"), "nice \u{1F60A}");
        assert_eq!(clean("nice, \u{1F60A}"), "nice \u{1F60A}");
    }

    #[test]
    fn composed_cleanup() {
        // Stage direction removed, filler stripped, and the trailing "!"
        // (no whitespace after it once trimmed) stays.
        assert_eq!(clean("Yeah, that's *laughs* cool! "), "that's cool!");
    }

    #[test]
    fn empty_in_empty_out() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
        assert_eq!(clean("*entirely stage direction*"), "");
    }

    #[test]
    fn truncates_at_word_boundary() {
        let long = "abcdef ".repeat(20); // 140 chars
        let out = clean(&long);
        assert!(out.chars().count() <= MAX_REPLY_CHARS);
        assert!(!out.is_empty());
        assert!(out.ends_with("abcdef"));
        // Never ends mid-word: every word in the output is intact.
        assert!(out.split(' ').all(|w| w == "abcdef"));
    }

    #[test]
    fn truncation_never_splits_multibyte() {
        let long = "héllo wörld ".repeat(20);
        let out = clean(&long);
        assert!(out.chars().count() <= MAX_REPLY_CHARS);
        assert!(out.split(' ').all(|w| w == "héllo" || w == "wörld"));
    }

    #[test]
    fn unbroken_text_over_limit_truncates_to_empty() {
        let wall = "a".repeat(200);
        assert_eq!(clean(&wall), "");
    }

    #[test]
    fn short_text_unchanged() {
        assert_eq!(clean("ship it"), "ship it");
    }

    #[test]
    fn idempotent_on_awkward_inputs() {
        let cases = [
            "Yeah, that's *laughs* cool! ",
            "Yeah! cool",
            "yeah yeah sounds right",
            "done..",
            "wow! nice! really!",
            "nice,\u{1F60A}",
            "plain text",
            "",
            "a! ",
        ];
        let sanitizer = Sanitizer::new();
        for case in cases {
            let once = sanitizer.clean(case);
            assert_eq!(sanitizer.clean(&once), once, "not idempotent for {case:?}");
        }
    }

    #[test]
    fn length_bound_holds_for_all_inputs() {
        let cases = [
            "word ".repeat(40),
            "a".repeat(300),
            format!("{} \u{1F60A}", "chat ".repeat(30)),
        ];
        for case in &cases {
            assert!(clean(case).chars().count() <= MAX_REPLY_CHARS);
        }
    }
}
