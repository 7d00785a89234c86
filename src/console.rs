//! Terminal presentation: banner, startup summary, cooldown prompt, and
//! the live countdown shown while the loop waits.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::{self, DEFAULT_COOLDOWN_SECS};

pub const CYAN: &str = "\x1b[36m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const GRAY: &str = "\x1b[90m";
pub const RESET: &str = "\x1b[0m";

/// Suspension seam for every wait in the dispatch loop.
///
/// The terminal implementation draws a live countdown; tests swap in a
/// recorder that returns immediately. Purely cosmetic, not part of any
/// scheduling contract.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pace(&self, label: &str, duration: Duration);
}

/// Countdown pacer writing an in-place gray `MM:SS` line to stderr.
pub struct TerminalPacer;

#[async_trait]
impl Pacer for TerminalPacer {
    async fn pace(&self, label: &str, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let end = tokio::time::Instant::now() + duration;
        let mut ticker = tokio::time::interval(Duration::from_millis(100));
        loop {
            ticker.tick().await;
            let now = tokio::time::Instant::now();
            if now >= end {
                break;
            }
            let secs = (end - now).as_secs();
            eprint!(
                "\r{GRAY}{label}: {:02}:{:02}   {RESET}",
                secs / 60,
                secs % 60
            );
            let _ = std::io::stderr().flush();
        }
        // Wipe the countdown line.
        eprint!("\r{:width$}\r", "", width = 50);
        let _ = std::io::stderr().flush();
    }
}

/// Clear the screen and print the startup banner plus run summary.
pub fn print_banner(account_count: usize, cooldown_secs: u64) {
    eprint!("\x1b[2J\x1b[1;1H");
    let rule = "=".repeat(60);
    eprintln!("{CYAN}{rule}{RESET}");
    eprintln!("{CYAN}   chorus :: shared-channel auto-responder{RESET}");
    eprintln!("{CYAN}{rule}{RESET}");
    eprintln!("Accounts loaded : {account_count}");
    eprintln!("Cooldown        : {}", format_duration(cooldown_secs));
    eprintln!("Status          : ready");
    eprintln!("{CYAN}{rule}{RESET}\n");
}

/// Ask the operator for the cooldown, falling back to the default on
/// blank or invalid input (and on EOF, for piped stdin).
pub async fn ask_cooldown() -> u64 {
    eprint!("{GREEN}Cooldown in seconds (default {DEFAULT_COOLDOWN_SECS}): {RESET}");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    let mut reader = BufReader::new(tokio::io::stdin());
    match reader.read_line(&mut line).await {
        Ok(_) => config::resolve_cooldown(&line),
        Err(_) => DEFAULT_COOLDOWN_SECS,
    }
}

/// Render a second count the way a human reads it: `45s`, `1m 5s`.
pub fn format_duration(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

// ── Tests ───────────────────────────────────────────────────────────
