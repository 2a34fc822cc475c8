//! Error types for the fallible edges of the simulation.
//!
//! Nothing inside a simulation step returns an error; bad numbers are
//! sanitized in place. Errors only come from loading configuration and
//! input files.

use thiserror::Error;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

#[derive(Debug, Error)]
pub enum CombatError {
    /// Could not read a configuration file.
    #[error("Failed to read config '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// RON syntax or schema error.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Tuning parsed but holds values the simulation cannot use.
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    /// Wave plan or squadron JSON could not be parsed.
    #[error("Failed to parse JSON input: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Runner I/O, such as spawning the loop thread or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An operation needed a running session.
    #[error("No combat session is active")]
    SessionNotActive,
}
