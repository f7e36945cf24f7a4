//! Focus counter: count the shapes that match a target shape and color.
//!
//! Each round deals `10 + 3 * level` shapes. Distractors differ from the
//! target in exactly one of shape or color. The tally is checked when the
//! player submits it or when the round clock runs out.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::{FocusCounterStats, GameId, GameMachine, GameStats, GameStatus, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Interval;

pub const DEFAULT_LIVES: u32 = 3;
pub const COLORS: [&str; 5] = ["red", "blue", "green", "yellow", "purple"];

const BASE_SHAPES: u32 = 10;
const MIN_TARGETS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Square, ShapeKind::Triangle];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeSize {
    Small,
    Medium,
    Large,
}

impl ShapeSize {
    pub const ALL: [ShapeSize; 3] = [ShapeSize::Small, ShapeSize::Medium, ShapeSize::Large];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub id: usize,
    pub kind: ShapeKind,
    pub color: &'static str,
    pub size: ShapeSize,
    pub is_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    pub kind: ShapeKind,
    pub color: &'static str,
}

/// Seconds allowed for a round at `level`.
pub fn round_secs(level: u32) -> u32 {
    30u32.saturating_sub(2 * level).max(10)
}

#[derive(Debug, Clone)]
pub struct FocusCounter {
    status: GameStatus,
    level: u32,
    score: u32,
    lives: u32,
    max_lives: u32,
    correct_rounds: u32,
    round: u32,
    time_left: u32,
    shapes: Vec<Shape>,
    target: Target,
    target_count: u32,
    user_count: u32,
    ticker: Interval,
    rng: Pcg64Mcg,
}

impl Default for FocusCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusCounter {
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        Self {
            status: GameStatus::Idle,
            level: 1,
            score: 0,
            lives: DEFAULT_LIVES,
            max_lives: DEFAULT_LIVES,
            correct_rounds: 0,
            round: 0,
            time_left: round_secs(1),
            shapes: Vec::new(),
            target: Target {
                kind: ShapeKind::Circle,
                color: COLORS[0],
            },
            target_count: 0,
            user_count: 0,
            ticker: Interval::new(TICK_MS),
            rng,
        }
    }

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.max_lives = lives.max(1);
        self.lives = self.max_lives;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// The answer for the current round.
    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn user_count(&self) -> u32 {
        self.user_count
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.status = GameStatus::Playing;
        self.level = 1;
        self.score = 0;
        self.lives = self.max_lives;
        self.correct_rounds = 0;
        self.round = 0;
        self.ticker.start(now_ms);
        let mut events = vec![GameEvent::Started];
        events.push(self.deal_round());
        events
    }

    pub fn increment(&mut self) -> Result<u32, GameError> {
        self.ensure_playing()?;
        self.user_count = (self.user_count + 1).min(self.shapes.len() as u32);
        Ok(self.user_count)
    }

    pub fn decrement(&mut self) -> Result<u32, GameError> {
        self.ensure_playing()?;
        self.user_count = self.user_count.saturating_sub(1);
        Ok(self.user_count)
    }

    /// Set the tally directly, clamped to the board size.
    pub fn set_count(&mut self, count: u32) -> Result<u32, GameError> {
        self.ensure_playing()?;
        self.user_count = count.min(self.shapes.len() as u32);
        Ok(self.user_count)
    }

    pub fn submit(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_playing()?;
        // A fresh round gets a full second on its first tick.
        self.ticker.start(now_ms);
        Ok(self.check_answer())
    }

    /// Advance the round clock by one second.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return Vec::new();
        }
        let mut events = vec![GameEvent::TimeUp];
        events.extend(self.check_answer());
        events
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.status == GameStatus::Playing {
            Ok(())
        } else {
            Err(GameError::NotPlaying)
        }
    }

    fn check_answer(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.user_count == self.target_count {
            let points = 10 * self.level;
            self.score += points;
            self.correct_rounds += 1;
            events.push(GameEvent::Correct { points });
            if self.correct_rounds % 2 == 0 {
                self.level += 1;
                events.push(GameEvent::LevelUp { level: self.level });
            }
        } else {
            self.lives = self.lives.saturating_sub(1);
            events.push(GameEvent::Incorrect {
                expected: Some(self.target_count.to_string()),
            });
            events.push(GameEvent::LifeLost {
                lives_left: self.lives,
            });
            if self.lives == 0 {
                self.status = GameStatus::Finished;
                self.ticker.stop();
                events.push(GameEvent::Finished);
                return events;
            }
        }
        events.push(self.deal_round());
        events
    }

    fn deal_round(&mut self) -> GameEvent {
        let kind = *ShapeKind::ALL.choose(&mut self.rng).unwrap_or(&ShapeKind::Circle);
        let color = *COLORS.choose(&mut self.rng).unwrap_or(&COLORS[0]);
        self.target = Target { kind, color };

        let total = BASE_SHAPES + 3 * self.level;
        let max_targets = MIN_TARGETS.max(total / 3);
        self.target_count = self.rng.gen_range(MIN_TARGETS..=max_targets);

        let mut shapes = Vec::with_capacity(total as usize);
        for _ in 0..self.target_count {
            shapes.push((kind, color, true));
        }
        for _ in self.target_count..total {
            let distractor = if self.rng.gen_bool(0.5) {
                let others: Vec<ShapeKind> =
                    ShapeKind::ALL.into_iter().filter(|k| *k != kind).collect();
                (*others.choose(&mut self.rng).unwrap_or(&kind), color)
            } else {
                let others: Vec<&'static str> =
                    COLORS.into_iter().filter(|c| *c != color).collect();
                (kind, *others.choose(&mut self.rng).unwrap_or(&color))
            };
            shapes.push((distractor.0, distractor.1, false));
        }
        shapes.shuffle(&mut self.rng);

        self.shapes = shapes
            .into_iter()
            .enumerate()
            .map(|(id, (kind, color, is_target))| Shape {
                id,
                kind,
                color,
                size: *ShapeSize::ALL.choose(&mut self.rng).unwrap_or(&ShapeSize::Medium),
                is_target,
            })
            .collect();
        self.user_count = 0;
        self.time_left = round_secs(self.level);
        self.round += 1;
        GameEvent::NewRound { round: self.round }
    }
}

impl GameMachine for FocusCounter {
    fn game_id(&self) -> GameId {
        GameId::FocusCounter
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while self.status == GameStatus::Playing && self.ticker.due(now_ms) {
            events.extend(self.tick());
        }
        events
    }

    fn stats(&self) -> GameStats {
        FocusCounterStats {
            score: self.score,
            level: self.level,
            lives_left: self.lives,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.ticker.stop();
    }
}
