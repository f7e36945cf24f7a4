//! TOML-based configuration.
//!
//! Holds the game tunables and storage settings. Stored at
//! `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{data_dir, SUGGESTIONS_KEY, USER_KEY};
use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";

/// Game tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesConfig {
    #[serde(default = "default_breathing_cycles")]
    pub breathing_cycles: u32,
    #[serde(default = "default_reaction_attempts")]
    pub reaction_attempts: u32,
    #[serde(default = "default_focus_lives")]
    pub focus_lives: u32,
    /// Color relaxation session length in seconds (60, 180 or 300).
    #[serde(default = "default_color_session_secs")]
    pub color_session_secs: u32,
    #[serde(default = "default_memory_match_delay_ms")]
    pub memory_match_delay_ms: u64,
    #[serde(default = "default_memory_mismatch_delay_ms")]
    pub memory_mismatch_delay_ms: u64,
}

/// Storage key layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_open_key_prefix")]
    pub open_key_prefix: String,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub games: GamesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_breathing_cycles() -> u32 {
    3
}
fn default_reaction_attempts() -> u32 {
    5
}
fn default_focus_lives() -> u32 {
    3
}
fn default_color_session_secs() -> u32 {
    60
}
fn default_memory_match_delay_ms() -> u64 {
    500
}
fn default_memory_mismatch_delay_ms() -> u64 {
    1_000
}
fn default_key_prefix() -> String {
    "healthgames_sessions_".into()
}
fn default_open_key_prefix() -> String {
    "healthgames_open_".into()
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            breathing_cycles: default_breathing_cycles(),
            reaction_attempts: default_reaction_attempts(),
            focus_lives: default_focus_lives(),
            color_session_secs: default_color_session_secs(),
            memory_match_delay_ms: default_memory_match_delay_ms(),
            memory_mismatch_delay_ms: default_memory_mismatch_delay_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            open_key_prefix: default_open_key_prefix(),
        }
    }
}

impl StorageConfig {
    /// Reject prefixes under which session lists, open slots and the other
    /// stored keys could be mistaken for one another.
    ///
    /// # Errors
    /// Returns `InvalidValue` naming the offending prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let prefixes = [
            ("storage.key_prefix", &self.key_prefix),
            ("storage.open_key_prefix", &self.open_key_prefix),
        ];
        for (key, prefix) in prefixes {
            if prefix.is_empty() {
                return Err(invalid(key, "prefix must not be empty".into()));
            }
            if let Some(reserved) = [USER_KEY, SUGGESTIONS_KEY]
                .into_iter()
                .find(|reserved| reserved.starts_with(prefix.as_str()))
            {
                return Err(invalid(
                    key,
                    format!("'{prefix}' would also match the '{reserved}' key"),
                ));
            }
        }

        if self.key_prefix.starts_with(&self.open_key_prefix)
            || self.open_key_prefix.starts_with(&self.key_prefix)
        {
            return Err(invalid(
                "storage.key_prefix",
                format!(
                    "'{}' and '{}' overlap",
                    self.key_prefix, self.open_key_prefix
                ),
            ));
        }
        Ok(())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<data dir>/config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        Ok(dir.join(CONFIG_FILE))
    }

    /// Load from the data directory, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.storage.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the existing value's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.storage.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.games.breathing_cycles, 3);
        assert_eq!(parsed.storage.key_prefix, "healthgames_sessions_");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[games]\nfocus_lives = 5\n").unwrap();
        assert_eq!(parsed.games.focus_lives, 5);
        assert_eq!(parsed.games.reaction_attempts, 5);
        assert_eq!(parsed.storage, StorageConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("games.breathing_cycles").as_deref(), Some("3"));
        assert_eq!(
            cfg.get("storage.open_key_prefix").as_deref(),
            Some("healthgames_open_")
        );
        assert!(cfg.get("games.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_numbers_and_strings() {
        let mut cfg = Config::default();
        cfg.set("games.reaction_attempts", "3").unwrap();
        cfg.set("storage.key_prefix", "hg_").unwrap();
        assert_eq!(cfg.games.reaction_attempts, 3);
        assert_eq!(cfg.storage.key_prefix, "hg_");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("games.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set("games.focus_lives", "many");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.games.focus_lives, 3);
    }

    #[test]
    fn overlapping_storage_prefixes_are_rejected() {
        let mut cfg = Config::default();
        assert!(cfg.storage.validate().is_ok());

        for (key, value) in [
            ("storage.key_prefix", "healthgames_"),
            ("storage.key_prefix", "healthgames_open_"),
            ("storage.open_key_prefix", "healthgames_sessions_ana"),
            ("storage.open_key_prefix", ""),
        ] {
            assert!(
                matches!(cfg.set(key, value), Err(ConfigError::InvalidValue { .. })),
                "{key} = {value:?} was accepted"
            );
        }
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_rejects_overlapping_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage]\nkey_prefix = \"healthgames_\"\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("games.color_session_secs", "180").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().games.color_session_secs, 180);
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "games = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
