mod config;
pub mod database;
mod memory;

pub use config::{Config, GamesConfig, StorageConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Key holding the signed-in user.
pub const USER_KEY: &str = "healthgames_user";
/// Key holding the last suggested game ids.
pub const SUGGESTIONS_KEY: &str = "healthgames_suggestions";

/// Returns the data directory, creating it if needed.
///
/// `HEALTHGAMES_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/healthgames[-dev]/`, with the `-dev` suffix selected by
/// `HEALTHGAMES_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("HEALTHGAMES_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("HEALTHGAMES_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("healthgames-dev")
            } else {
                base_dir.join("healthgames")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// String key-value persistence for session lists.
///
/// Values are opaque JSON blobs; the ledger owns their format.
pub trait SessionStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys_with_prefix(prefix)
    }
}
