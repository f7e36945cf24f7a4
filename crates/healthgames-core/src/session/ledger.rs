use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{GameSession, SessionOutcome, User};
use crate::error::CoreError;
use crate::events::Event;
use crate::games::GameId;
use crate::storage::{SessionStore, StorageConfig};
use crate::timer::Clock;

/// Owns the session list of the active identity and its open session.
///
/// At most one session is open at a time. Every mutation is written through
/// to the store when an identity is set; write failures are logged and
/// otherwise ignored. An anonymous ledger keeps everything in memory.
pub struct SessionLedger<S> {
    store: S,
    clock: Arc<dyn Clock>,
    key_prefix: String,
    open_key_prefix: String,
    user: Option<User>,
    sessions: Vec<GameSession>,
    current: Option<GameSession>,
}

impl<S: SessionStore> SessionLedger<S> {
    /// Anonymous ledger with the default key layout.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        let storage = StorageConfig::default();
        Self {
            store,
            clock,
            key_prefix: storage.key_prefix,
            open_key_prefix: storage.open_key_prefix,
            user: None,
            sessions: Vec::new(),
            current: None,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_storage_config(mut self, storage: &StorageConfig) -> Self {
        self.key_prefix = storage.key_prefix.clone();
        self.open_key_prefix = storage.open_key_prefix.clone();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Closed sessions of the active identity, oldest first.
    pub fn sessions(&self) -> &[GameSession] {
        &self.sessions
    }

    /// The open session, if any.
    pub fn current(&self) -> Option<&GameSession> {
        self.current.as_ref()
    }

    /// Open a session for `game_id`, force-closing any stale open session
    /// first.
    pub fn start(&mut self, game_id: GameId) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(event) = self.force_close() {
            events.push(event);
        }

        let now = self.clock.now_ms();
        self.current = Some(GameSession::open(game_id, now));
        self.persist();
        debug!(game = %game_id, start_time = now, "session started");

        events.push(Event::SessionStarted {
            game_id,
            start_time: now,
            at: timestamp(now),
        });
        events
    }

    /// Close the open session. A no-op unless `game_id` matches it.
    pub fn end(&mut self, game_id: GameId, outcome: SessionOutcome) -> Vec<Event> {
        let open = match self.current.take() {
            Some(open) if open.game_id == game_id => open,
            other => {
                warn!(
                    game = %game_id,
                    open = ?other.as_ref().map(|s| s.game_id),
                    "ignoring end for a session that is not open"
                );
                self.current = other;
                return Vec::new();
            }
        };

        let now = self.clock.now_ms();
        let closed = open.close(now, outcome);
        debug!(
            game = %game_id,
            duration_ms = closed.duration.unwrap_or(0),
            completed = closed.completed,
            "session ended"
        );
        let event = Event::SessionEnded {
            game_id,
            duration_ms: closed.duration.unwrap_or(0),
            completed: closed.completed,
            closed_tab: closed.closed_tab,
            at: timestamp(now),
        };
        self.sessions.push(closed);
        self.persist();
        vec![event]
    }

    /// Close whatever is open as abandoned by teardown.
    pub fn flush_on_teardown(&mut self) -> Vec<Event> {
        match self.current.as_ref().map(|s| s.game_id) {
            Some(game_id) => self.end(game_id, SessionOutcome::closed_tab()),
            None => Vec::new(),
        }
    }

    /// Change identity. The open session is closed into the previous
    /// identity's list before the new list is loaded.
    pub fn switch_user(&mut self, user: Option<User>) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(event) = self.force_close() {
            events.push(event);
        }

        self.user = user;
        self.sessions = Vec::new();
        self.current = None;
        if let Some(user) = &self.user {
            let sessions_key = format!("{}{}", self.key_prefix, user.id);
            self.sessions = match self.store.load(&sessions_key) {
                Ok(Some(raw)) => parse_sessions(&sessions_key, &raw),
                Ok(None) => Vec::new(),
                Err(e) => {
                    warn!(key = %sessions_key, error = %e, "failed to load sessions");
                    Vec::new()
                }
            };

            let open_key = format!("{}{}", self.open_key_prefix, user.id);
            self.current = match self.store.load(&open_key) {
                Ok(Some(raw)) => serde_json::from_str::<GameSession>(&raw)
                    .map_err(|e| warn!(key = %open_key, error = %e, "discarding corrupt open session"))
                    .ok()
                    .filter(GameSession::is_open),
                Ok(None) => None,
                Err(e) => {
                    warn!(key = %open_key, error = %e, "failed to load open session");
                    None
                }
            };
        }

        debug!(
            user = ?self.user.as_ref().map(|u| u.id.as_str()),
            sessions = self.sessions.len(),
            "identity switched"
        );
        events.push(Event::UserSwitched {
            user_id: self.user.as_ref().map(|u| u.id.clone()),
            sessions_loaded: self.sessions.len(),
            at: timestamp(self.clock.now_ms()),
        });
        events
    }

    fn force_close(&mut self) -> Option<Event> {
        let stale = self.current.take()?;
        let now = self.clock.now_ms();
        let closed = stale.close(now, SessionOutcome::abandoned(None));
        debug!(game = %closed.game_id, "force-closed stale session");
        let event = Event::SessionForceClosed {
            game_id: closed.game_id,
            duration_ms: closed.duration.unwrap_or(0),
            at: timestamp(now),
        };
        self.sessions.push(closed);
        self.persist();
        Some(event)
    }

    fn persist(&self) {
        let Some(user) = &self.user else {
            return;
        };

        let sessions_key = format!("{}{}", self.key_prefix, user.id);
        match serde_json::to_string(&self.sessions) {
            Ok(json) => {
                if let Err(e) = self.store.save(&sessions_key, &json) {
                    warn!(key = %sessions_key, error = %e, "failed to persist sessions");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize sessions"),
        }

        let open_key = format!("{}{}", self.open_key_prefix, user.id);
        let written = match &self.current {
            Some(open) => serde_json::to_string(open)
                .map_err(CoreError::from)
                .and_then(|json| Ok(self.store.save(&open_key, &json)?)),
            None => self.store.remove(&open_key).map_err(CoreError::from),
        };
        if let Err(e) = written {
            warn!(key = %open_key, error = %e, "failed to persist open session");
        }
    }
}

/// Parse a persisted session list.
///
/// Records are decoded one by one: a record that fails to decode is logged
/// and dropped while the rest are kept. Data that is not a JSON array at all
/// is logged and read as empty.
pub fn parse_sessions(key: &str, raw: &str) -> Vec<GameSession> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(key = %key, error = %e, "discarding corrupt session list");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value(record)
                .map_err(|e| warn!(key = %key, index, error = %e, "dropping corrupt session record"))
                .ok()
        })
        .collect()
}

/// Every stored user's session list, keyed by user id, in key order.
pub fn stored_sessions<S: SessionStore>(store: &S, prefix: &str) -> Vec<(String, Vec<GameSession>)> {
    let keys = match store.keys_with_prefix(prefix) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(prefix = %prefix, error = %e, "failed to list stored users");
            return Vec::new();
        }
    };

    keys.into_iter()
        .filter_map(|key| {
            let raw = store
                .load(&key)
                .map_err(|e| warn!(key = %key, error = %e, "failed to load sessions"))
                .ok()??;
            let sessions = parse_sessions(&key, &raw);
            Some((key[prefix.len()..].to_string(), sessions))
        })
        .collect()
}

fn timestamp(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}
