//! Per-game summaries with pluggable best-score rules.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::games::{GameId, GameStats};
use crate::session::GameSession;

/// Which way a score improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDirection {
    LowerIsBetter,
    HigherIsBetter,
}

impl ScoreDirection {
    fn prefers(self, candidate: f64, best: f64) -> bool {
        match self {
            ScoreDirection::LowerIsBetter => candidate < best,
            ScoreDirection::HigherIsBetter => candidate > best,
        }
    }
}

/// How to pull a comparable score out of a stats payload.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRule {
    pub direction: ScoreDirection,
    /// Only consider sessions that ran to completion.
    pub completed_only: bool,
    pub extract: fn(&GameStats) -> Option<f64>,
}

impl ScoreRule {
    pub fn higher(extract: fn(&GameStats) -> Option<f64>) -> Self {
        Self {
            direction: ScoreDirection::HigherIsBetter,
            completed_only: false,
            extract,
        }
    }

    pub fn lower(extract: fn(&GameStats) -> Option<f64>) -> Self {
        Self {
            direction: ScoreDirection::LowerIsBetter,
            completed_only: false,
            extract,
        }
    }

    pub fn completed_only(mut self) -> Self {
        self.completed_only = true;
        self
    }

    fn score(&self, session: &GameSession) -> Option<f64> {
        if self.completed_only && !session.completed {
            return None;
        }
        session.stats.as_ref().and_then(self.extract)
    }
}

/// Aggregate of every session of one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: GameId,
    pub sessions: u32,
    pub completed: u32,
    /// Sum of known durations in milliseconds.
    pub total_duration: u64,
    pub best_score: Option<f64>,
    pub direction: Option<ScoreDirection>,
    /// Start time of the latest session.
    pub last_played: u64,
}

impl GameSummary {
    fn new(game_id: GameId, first_start: u64) -> Self {
        Self {
            game_id,
            sessions: 0,
            completed: 0,
            total_duration: 0,
            best_score: None,
            direction: None,
            last_played: first_start,
        }
    }

    pub fn completion_rate(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        f64::from(self.completed) / f64::from(self.sessions) * 100.0
    }
}

/// Folds session lists into [`GameSummary`] records.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    rules: BTreeMap<GameId, ScoreRule>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            GameId::Reaction,
            ScoreRule::lower(|s| match s {
                GameStats::Reaction(r) => r.best_time.map(|t| t as f64),
                _ => None,
            })
            .completed_only(),
        );
        rules.insert(
            GameId::Memory,
            ScoreRule::lower(|s| match s {
                GameStats::Memory(m) => Some(f64::from(m.moves)),
                _ => None,
            })
            .completed_only(),
        );
        rules.insert(
            GameId::Breathing,
            ScoreRule::higher(|s| match s {
                GameStats::Breathing(b) => Some(f64::from(b.cycles_completed)),
                _ => None,
            }),
        );
        rules.insert(
            GameId::ColorRelaxation,
            ScoreRule::higher(|s| match s {
                GameStats::ColorRelaxation(c) => Some(f64::from(c.total_breaths)),
                _ => None,
            }),
        );
        rules.insert(
            GameId::MusicTherapy,
            ScoreRule::higher(|s| match s {
                GameStats::MusicTherapy(m) => Some(f64::from(m.level)),
                _ => None,
            }),
        );
        for game in [
            GameId::WordScramble,
            GameId::PatternMatch,
            GameId::FocusCounter,
            GameId::MathChallenge,
        ] {
            rules.insert(game, ScoreRule::higher(|s| s.score().map(f64::from)));
        }
        Self { rules }
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rule for one game.
    pub fn with_rule(mut self, game_id: GameId, rule: ScoreRule) -> Self {
        self.rules.insert(game_id, rule);
        self
    }

    pub fn rule(&self, game_id: GameId) -> Option<&ScoreRule> {
        self.rules.get(&game_id)
    }

    /// One summary per game present in `sessions`, in game order.
    ///
    /// Sessions without a duration or stats still count; they just add
    /// nothing to the duration total or best score.
    pub fn summarize(&self, sessions: &[GameSession]) -> Vec<GameSummary> {
        let mut by_game: BTreeMap<GameId, GameSummary> = BTreeMap::new();

        for session in sessions {
            let summary = by_game
                .entry(session.game_id)
                .or_insert_with(|| GameSummary::new(session.game_id, session.start_time));
            summary.sessions += 1;
            if session.completed {
                summary.completed += 1;
            }
            summary.total_duration += session.duration.unwrap_or(0);
            summary.last_played = summary.last_played.max(session.start_time);

            let Some(rule) = self.rules.get(&session.game_id) else {
                continue;
            };
            summary.direction = Some(rule.direction);
            if let Some(score) = rule.score(session) {
                let better = summary
                    .best_score
                    .map_or(true, |best| rule.direction.prefers(score, best));
                if better {
                    summary.best_score = Some(score);
                }
            }
        }

        by_game.into_values().collect()
    }
}

/// Summaries under the default rules.
pub fn summarize(sessions: &[GameSession]) -> Vec<GameSummary> {
    StatsAggregator::default().summarize(sessions)
}
