//! Core error types for healthgames-core.
//!
//! Nothing in the core is fatal: storage problems degrade to empty state and
//! invalid player input is reported back without touching machine state. These
//! types carry the details so callers can log or display them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for healthgames-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected player input or move
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Rejected player actions. Returning one of these never changes machine state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The machine is not in a state that accepts this action
    #[error("Game is not in progress")]
    NotPlaying,

    /// Input could not be understood (e.g. a non-numeric answer)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The move is not allowed right now
    #[error("Move rejected: {0}")]
    MoveRejected(String),

    /// Index outside the board or option list
    #[error("Index {index} out of bounds (length: {len})")]
    OutOfBounds { index: usize, len: usize },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_error_messages() {
        let err = GameError::OutOfBounds { index: 17, len: 16 };
        assert_eq!(err.to_string(), "Index 17 out of bounds (length: 16)");

        let core: CoreError = GameError::NotPlaying.into();
        assert_eq!(core.to_string(), "Game error: Game is not in progress");
    }

    #[test]
    fn rusqlite_errors_map_to_query_failed() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
