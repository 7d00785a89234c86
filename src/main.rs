use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use chorus::channel::DiscordRest;
use chorus::config::{self, PoolConfig};
use chorus::console::{self, TerminalPacer, YELLOW, RESET};
use chorus::dispatch::Dispatcher;
use chorus::llm::{GenerationClient, GroqCompletions, KeyPool};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Generation keys, one per line. Missing or empty is fatal.
    let keys_path =
        std::env::var("CHORUS_KEYS").unwrap_or_else(|_| config::DEFAULT_KEYS_PATH.to_string());
    let keys = config::load_keys(Path::new(&keys_path)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    // Channel ids and the account pool. Missing or empty is fatal.
    let accounts_path = std::env::var("CHORUS_ACCOUNTS")
        .unwrap_or_else(|_| config::DEFAULT_ACCOUNTS_PATH.to_string());
    let pool_config = PoolConfig::load(Path::new(&accounts_path)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    // CHORUS_COOLDOWN skips the prompt for non-interactive runs.
    let cooldown_secs = match std::env::var("CHORUS_COOLDOWN") {
        Ok(raw) => config::resolve_cooldown(&raw),
        Err(_) => console::ask_cooldown().await,
    };

    console::print_banner(pool_config.accounts.len(), cooldown_secs);

    let generator = GenerationClient::new(Box::new(GroqCompletions::new()), KeyPool::new(keys));
    let dispatcher = Dispatcher::new(
        pool_config,
        Arc::new(DiscordRest::new()),
        generator,
        cooldown_secs,
        Arc::new(TerminalPacer),
        StdRng::from_entropy(),
    );

    tokio::select! {
        _ = dispatcher.run() => {}
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{YELLOW}Stopped by operator{RESET}");
        }
    }
}
