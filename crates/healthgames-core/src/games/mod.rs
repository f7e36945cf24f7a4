//! The mini-game state machines.
//!
//! Every game follows the same outer shape:
//!
//! ```text
//! Idle -> Playing (<-> Paused) -> Finished -> Idle (via reset / start)
//! ```
//!
//! and refines `Playing` with its own phase enum. Machines never read the
//! clock themselves: the caller passes `now_ms` to `poll`, which fires any due
//! interval ticks or scheduled transitions and returns the resulting events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::events::GameEvent;
use crate::session::SessionOutcome;

pub mod breathing;
pub mod catalog;
pub mod color_relaxation;
pub mod focus_counter;
pub mod math;
pub mod memory;
pub mod music;
pub mod pattern;
pub mod reaction;
mod run;
mod stats;
pub mod word_scramble;

pub use breathing::{BreathPhase, BreathingPacer};
pub use catalog::{catalog, find_game, GameInfo};
pub use color_relaxation::{ColorBreath, ColorRelaxation};
pub use focus_counter::FocusCounter;
pub use math::MentalMath;
pub use memory::MemoryMatch;
pub use music::{MusicMode, MusicalMemory};
pub use pattern::PatternMatch;
pub use reaction::ReactionTimer;
pub use run::GameRun;
pub use stats::{
    BreathingStats, ColorRelaxationStats, FocusCounterStats, GameStats, MathChallengeStats,
    MemoryStats, MusicStats, PatternMatchStats, ReactionStats, WordScrambleStats,
};
pub use word_scramble::WordScramble;

/// Period of the standard game tick.
pub const TICK_MS: u64 = 1_000;

/// The fixed set of mini-games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    Memory,
    Breathing,
    Reaction,
    WordScramble,
    ColorRelaxation,
    PatternMatch,
    FocusCounter,
    MathChallenge,
    MusicTherapy,
}

impl GameId {
    pub const ALL: [GameId; 9] = [
        GameId::Memory,
        GameId::Breathing,
        GameId::Reaction,
        GameId::WordScramble,
        GameId::ColorRelaxation,
        GameId::PatternMatch,
        GameId::FocusCounter,
        GameId::MathChallenge,
        GameId::MusicTherapy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Memory => "memory",
            GameId::Breathing => "breathing",
            GameId::Reaction => "reaction",
            GameId::WordScramble => "word-scramble",
            GameId::ColorRelaxation => "color-relaxation",
            GameId::PatternMatch => "pattern-match",
            GameId::FocusCounter => "focus-counter",
            GameId::MathChallenge => "math-challenge",
            GameId::MusicTherapy => "music-therapy",
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| GameError::InvalidInput(format!("unknown game: {s}")))
    }
}

/// Outer lifecycle state shared by every machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Idle,
    Playing,
    Paused,
    /// Terminal: only exit, feedback or a fresh start are valid.
    Finished,
}

/// Common interface of the mini-game machines.
pub trait GameMachine {
    fn game_id(&self) -> GameId;

    fn status(&self) -> GameStatus;

    /// Fire every interval tick and scheduled transition due at `now_ms`.
    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent>;

    /// Best-known stats so far; final once the machine is finished.
    fn stats(&self) -> GameStats;

    /// Disarm every timer. Called on exit; idempotent.
    fn stop_timers(&mut self);

    fn is_finished(&self) -> bool {
        self.status() == GameStatus::Finished
    }

    /// Payload for the ledger: completed when the machine reached its
    /// terminal state, abandoned otherwise.
    fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            completed: Some(self.is_finished()),
            closed_tab: false,
            stats: Some(self.stats()),
        }
    }
}
