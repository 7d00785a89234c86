//! Error types for chorus.

/// Top-level error type for the responder.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),
}

/// Configuration-related errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required file: {path}. {hint}")]
    MissingFile { path: String, hint: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("No accounts defined in {path}")]
    NoAccounts { path: String },

    #[error("No API keys found in {path}")]
    EmptyKeyPool { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Channel transport errors. Always recoverable: the dispatch loop absorbs
/// them and retries on a later cycle.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
}

/// Reply generation errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Completion request failed: {0}")]
    Backend(String),

    #[error("Completion endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed completion response: {0}")]
    InvalidResponse(String),

    #[error("All {attempts} generation keys failed for this prompt")]
    Exhausted { attempts: usize },
}

/// Result type alias for the responder.
pub type Result<T> = std::result::Result<T, Error>;
