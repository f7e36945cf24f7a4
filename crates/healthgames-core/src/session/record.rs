use serde::{Deserialize, Serialize};

use crate::games::{GameId, GameStats};

/// One timed attempt at a single game.
///
/// Open while `end_time` is `None`; closed exactly once by the ledger and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub game_id: GameId,
    pub start_time: u64,
    pub end_time: Option<u64>,
    /// `end_time - start_time` in milliseconds once closed.
    pub duration: Option<u64>,
    pub completed: bool,
    #[serde(default)]
    pub closed_tab: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<GameStats>,
}

impl GameSession {
    pub(crate) fn open(game_id: GameId, start_time: u64) -> Self {
        Self {
            game_id,
            start_time,
            end_time: None,
            duration: None,
            completed: false,
            closed_tab: false,
            stats: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Duration in whole minutes, rounded down. Zero while open.
    pub fn minutes(&self) -> u64 {
        self.duration.unwrap_or(0) / 60_000
    }

    pub(crate) fn close(mut self, end_time: u64, outcome: SessionOutcome) -> Self {
        let end_time = end_time.max(self.start_time);
        self.end_time = Some(end_time);
        self.duration = Some(end_time - self.start_time);
        self.completed = outcome.completed.unwrap_or(true);
        self.closed_tab = outcome.closed_tab;
        if outcome.stats.is_some() {
            self.stats = outcome.stats;
        }
        self
    }
}

/// How a session ended. `completed` defaults to true when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub completed: Option<bool>,
    #[serde(default)]
    pub closed_tab: bool,
    pub stats: Option<GameStats>,
}

impl SessionOutcome {
    pub fn completed(stats: impl Into<GameStats>) -> Self {
        Self {
            completed: Some(true),
            closed_tab: false,
            stats: Some(stats.into()),
        }
    }

    pub fn abandoned(stats: Option<GameStats>) -> Self {
        Self {
            completed: Some(false),
            closed_tab: false,
            stats,
        }
    }

    /// Environment teardown with the session still open.
    pub fn closed_tab() -> Self {
        Self {
            completed: Some(false),
            closed_tab: true,
            stats: None,
        }
    }
}
