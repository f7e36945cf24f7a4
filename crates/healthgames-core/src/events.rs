use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::games::{BreathPhase, ColorBreath, GameId};

/// Every change to the session ledger produces an Event.
/// Front-ends print or display them; nothing reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        game_id: GameId,
        start_time: u64,
        at: DateTime<Utc>,
    },
    /// A stale open session was closed because another one started
    /// (or the identity changed).
    SessionForceClosed {
        game_id: GameId,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    SessionEnded {
        game_id: GameId,
        duration_ms: u64,
        completed: bool,
        closed_tab: bool,
        at: DateTime<Utc>,
    },
    UserSwitched {
        user_id: Option<String>,
        sessions_loaded: usize,
        at: DateTime<Utc>,
    },
    SuggestionsUpdated {
        game_ids: Vec<String>,
        at: DateTime<Utc>,
    },
}

/// Notifications emitted by the game machines.
///
/// These are the transient messages a front-end shows the player; the
/// authoritative state always stays inside the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Reset,
    /// Countdown or round timer ran out.
    TimeUp,
    /// The machine reached its terminal state.
    Finished,

    // Breathing pacer
    BreathPhaseChanged { phase: BreathPhase },
    CycleCompleted { cycles: u32 },

    // Reaction timer
    CountdownStarted { seconds: u32 },
    /// Countdown done; the go signal is scheduled after a random delay.
    Armed,
    /// Go signal: click now.
    Ready,
    FalseStart,
    ReactionRecorded { elapsed_ms: u64, attempt: usize },

    // Memory match
    CardFlipped { index: usize },
    PairMatched { first: usize, second: usize },
    PairMissed { first: usize, second: usize },

    // Scored rounds (math, pattern, word, focus)
    Correct { points: u32 },
    Incorrect { expected: Option<String> },
    NewRound { round: u32 },
    LevelUp { level: u32 },
    LifeLost { lives_left: u32 },

    // Musical memory
    NoteStarted { note: usize, frequency_hz: f64 },
    NoteStopped { note: usize },
    /// Playback finished; the player may now repeat the sequence.
    YourTurn { length: usize },
    WrongSequence,

    // Color relaxation
    ColorBreathChanged { phase: ColorBreath, prompt: String },
    ColorChanged { color: String, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(GameEvent::ReactionRecorded {
            elapsed_ms: 230,
            attempt: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "reaction_recorded");
        assert_eq!(json["elapsed_ms"], 230);

        let json = serde_json::to_value(Event::SessionStarted {
            game_id: GameId::Memory,
            start_time: 1,
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["type"], "session_started");
        assert_eq!(json["game_id"], "memory");
    }
}
