/// Error types for everything that can fail outside the simulation tick.
///
/// The tick itself is total; only configuration loading and the external
/// collaborators (profile storage, leaderboard) produce errors, and callers
/// degrade gracefully instead of letting them reach the game loop.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is outside the range the simulation can work with.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard backend unavailable")]
    Unavailable,

    #[error("leaderboard request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("leaderboard backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
