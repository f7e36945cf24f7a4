//! Shared state for commands: the database, the config and the ledger of the
//! signed-in user.

use std::sync::Arc;

use healthgames_core::storage::{data_dir, SessionStore, SUGGESTIONS_KEY, USER_KEY};
use healthgames_core::timer::SystemClock;
use healthgames_core::{Config, Database, Event, SessionLedger, SuggestionRelay, User};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn load_config() -> Config {
    match data_dir() {
        Ok(dir) => Config::load_from(&dir.join("config.toml")).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default config");
            Config::default()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "data directory unavailable, using default config");
            Config::default()
        }
    }
}

/// The persisted signed-in user, if any.
pub fn current_user(db: &Database) -> Option<User> {
    let raw = db.load(USER_KEY).ok()??;
    serde_json::from_str(&raw)
        .map_err(|e| tracing::warn!(error = %e, "discarding corrupt user record"))
        .ok()
}

pub fn save_user(db: &Database, user: Option<&User>) -> CliResult {
    match user {
        Some(user) => db.save(USER_KEY, &serde_json::to_string(user)?)?,
        None => db.remove(USER_KEY)?,
    }
    Ok(())
}

/// Open the database and build a ledger for the signed-in user.
pub fn open_ledger() -> CliResult<(SessionLedger<Database>, Config)> {
    let config = load_config();
    let db = Database::open()?;
    let user = current_user(&db);
    let mut ledger =
        SessionLedger::new(db, Arc::new(SystemClock)).with_storage_config(&config.storage);
    ledger.switch_user(user);
    Ok((ledger, config))
}

pub fn load_suggestions(db: &Database) -> SuggestionRelay {
    let mut relay = SuggestionRelay::new();
    if let Ok(Some(raw)) = db.load(SUGGESTIONS_KEY) {
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                relay.suggest(ids);
            }
            Err(e) => tracing::warn!(error = %e, "discarding corrupt suggestions"),
        }
    }
    relay
}

pub fn save_suggestions(db: &Database, relay: &SuggestionRelay) -> CliResult {
    db.save(SUGGESTIONS_KEY, &serde_json::to_string(relay.current())?)?;
    Ok(())
}

/// Print ledger events to stderr, one JSON object per line.
pub fn report(events: &[Event]) {
    for event in events {
        if let Ok(json) = serde_json::to_string(event) {
            eprintln!("{json}");
        }
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
