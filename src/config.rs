//! File-based configuration: pool accounts, channel ids, generation keys.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Default path of the accounts file.
pub const DEFAULT_ACCOUNTS_PATH: &str = "accounts.json";
/// Default path of the generation key file, one key per line.
pub const DEFAULT_KEYS_PATH: &str = ".env";
/// Cooldown applied when the operator gives no (or a nonsense) value.
pub const DEFAULT_COOLDOWN_SECS: u64 = 20;

/// One chat account in the pool. Immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// Stable display name, also the cooldown-tracking key.
    pub name: String,
    /// Authorization token for the chat API.
    pub token: SecretString,
    /// The account's own user id, used to filter self-authored messages.
    pub user_id: String,
}

/// The accounts file: which channel to watch and who participates.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub guild_id: String,
    pub channel_id: String,
    pub accounts: Vec<Account>,
}

impl PoolConfig {
    /// Load and validate the accounts file. Any failure here is fatal at
    /// startup.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
                hint: "Create it with guild_id, channel_id and an accounts list".to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if config.accounts.is_empty() {
            return Err(ConfigError::NoAccounts {
                path: path.display().to_string(),
            });
        }
        Ok(config)
    }
}

/// Load the ordered generation key pool: one key per line, blank lines
/// skipped. An empty pool is fatal at startup.
pub fn load_keys(path: &Path) -> Result<Vec<SecretString>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
            hint: "Create it with one generation API key per line".to_string(),
        });
    }
    let raw = std::fs::read_to_string(path)?;
    let keys: Vec<SecretString> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| SecretString::from(line.to_string()))
        .collect();
    if keys.is_empty() {
        return Err(ConfigError::EmptyKeyPool {
            path: path.display().to_string(),
        });
    }
    Ok(keys)
}

/// Interpret an operator-supplied cooldown value. Blank, unparsable or
/// sub-second input falls back to [`DEFAULT_COOLDOWN_SECS`].
pub fn resolve_cooldown(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n as u64,
        _ => DEFAULT_COOLDOWN_SECS,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_accounts_file() {
        let file = write_temp(
            r#"{
                "guild_id": "1111",
                "channel_id": "2222",
                "accounts": [
                    {"name": "alpha", "token": "tok-a", "user_id": "10"},
                    {"name": "beta", "token": "tok-b", "user_id": "20"}
                ]
            }"#,
        );
        let config = PoolConfig::load(file.path()).unwrap();
        assert_eq!(config.guild_id, "1111");
        assert_eq!(config.channel_id, "2222");
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].name, "alpha");
        assert_eq!(config.accounts[1].user_id, "20");
    }

    #[test]
    fn missing_accounts_file_is_fatal() {
        let err = PoolConfig::load(Path::new("/nonexistent/accounts.json")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn malformed_accounts_file_is_fatal() {
        let file = write_temp("{ not json");
        let err = PoolConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_account_list_is_fatal() {
        let file = write_temp(r#"{"guild_id": "1", "channel_id": "2", "accounts": []}"#);
        let err = PoolConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NoAccounts { .. }));
    }

    #[test]
    fn loads_keys_skipping_blank_lines() {
        let file = write_temp("key-one\n\n  key-two  \n\n");
        let keys = load_keys(file.path()).unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn empty_key_file_is_fatal() {
        let file = write_temp("\n  \n");
        let err = load_keys(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyKeyPool { .. }));
    }

    #[test]
    fn missing_key_file_is_fatal() {
        let err = load_keys(Path::new("/nonexistent/.env")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn cooldown_defaults_on_bad_input() {
        assert_eq!(resolve_cooldown(""), DEFAULT_COOLDOWN_SECS);
        assert_eq!(resolve_cooldown("abc"), DEFAULT_COOLDOWN_SECS);
        assert_eq!(resolve_cooldown("0"), DEFAULT_COOLDOWN_SECS);
        assert_eq!(resolve_cooldown("-5"), DEFAULT_COOLDOWN_SECS);
    }

    #[test]
    fn cooldown_accepts_valid_input() {
        assert_eq!(resolve_cooldown("1"), 1);
        assert_eq!(resolve_cooldown(" 45 "), 45);
        assert_eq!(resolve_cooldown("600"), 600);
    }
}
