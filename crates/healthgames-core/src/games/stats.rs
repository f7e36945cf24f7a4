//! Per-game stats payloads reported to the session ledger.
//!
//! Serialized as an internally tagged union so the persisted JSON stays
//! self-describing: `{"kind": "memory", "moves": 14, "matchedPairs": 8}`.

use serde::{Deserialize, Serialize};

use super::music::MusicMode;
use super::GameId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub moves: u32,
    pub matched_pairs: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingStats {
    pub cycles_completed: u32,
    /// Seconds spent actively breathing (paused time excluded).
    pub total_time_spent: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStats {
    /// Fastest attempt in milliseconds.
    pub best_time: Option<u64>,
    /// Mean of all attempts in milliseconds.
    pub average_time: Option<f64>,
    pub attempts: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordScrambleStats {
    pub score: u32,
    pub rounds: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorRelaxationStats {
    /// Seconds of the session actually spent.
    pub duration: u32,
    pub color_changes: u32,
    pub total_breaths: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatchStats {
    pub score: u32,
    pub level: u32,
    pub correct_answers: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusCounterStats {
    pub score: u32,
    pub level: u32,
    pub lives_left: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathChallengeStats {
    pub score: u32,
    pub level: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    /// Percentage of answered problems that were correct, rounded.
    pub accuracy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicStats {
    pub mode: MusicMode,
    pub level: u32,
    pub sequence_length: u32,
}

/// Stats payload of one finished or abandoned game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GameStats {
    Memory(MemoryStats),
    Breathing(BreathingStats),
    Reaction(ReactionStats),
    WordScramble(WordScrambleStats),
    ColorRelaxation(ColorRelaxationStats),
    PatternMatch(PatternMatchStats),
    FocusCounter(FocusCounterStats),
    MathChallenge(MathChallengeStats),
    MusicTherapy(MusicStats),
}

impl GameStats {
    /// The game this payload belongs to.
    pub fn game_id(&self) -> GameId {
        match self {
            GameStats::Memory(_) => GameId::Memory,
            GameStats::Breathing(_) => GameId::Breathing,
            GameStats::Reaction(_) => GameId::Reaction,
            GameStats::WordScramble(_) => GameId::WordScramble,
            GameStats::ColorRelaxation(_) => GameId::ColorRelaxation,
            GameStats::PatternMatch(_) => GameId::PatternMatch,
            GameStats::FocusCounter(_) => GameId::FocusCounter,
            GameStats::MathChallenge(_) => GameId::MathChallenge,
            GameStats::MusicTherapy(_) => GameId::MusicTherapy,
        }
    }

    /// Headline score for games that keep one.
    pub fn score(&self) -> Option<u32> {
        match self {
            GameStats::WordScramble(s) => Some(s.score),
            GameStats::PatternMatch(s) => Some(s.score),
            GameStats::FocusCounter(s) => Some(s.score),
            GameStats::MathChallenge(s) => Some(s.score),
            _ => None,
        }
    }
}

macro_rules! impl_from_stats {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for GameStats {
            fn from(stats: $ty) -> Self {
                GameStats::$variant(stats)
            }
        })*
    };
}

impl_from_stats! {
    MemoryStats => Memory,
    BreathingStats => Breathing,
    ReactionStats => Reaction,
    WordScrambleStats => WordScramble,
    ColorRelaxationStats => ColorRelaxation,
    PatternMatchStats => PatternMatch,
    FocusCounterStats => FocusCounter,
    MathChallengeStats => MathChallenge,
    MusicStats => MusicTherapy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let stats: GameStats = MemoryStats {
            moves: 14,
            matched_pairs: 8,
        }
        .into();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["kind"], "memory");
        assert_eq!(json["moves"], 14);
        assert_eq!(json["matchedPairs"], 8);
    }

    #[test]
    fn reaction_payload_parses() {
        let json = r#"{"kind":"reaction","bestTime":212,"averageTime":260.5,"attempts":[212,309]}"#;
        let stats: GameStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.game_id(), GameId::Reaction);
        match stats {
            GameStats::Reaction(r) => assert_eq!(r.best_time, Some(212)),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn music_mode_is_lowercase() {
        let stats: GameStats = MusicStats {
            mode: MusicMode::Repeat,
            level: 4,
            sequence_length: 4,
        }
        .into();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["kind"], "music-therapy");
        assert_eq!(json["mode"], "repeat");
    }
}
