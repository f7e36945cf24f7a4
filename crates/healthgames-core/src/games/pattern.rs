//! Pattern match: pick the option identical to the target sequence.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use super::{GameId, GameMachine, GameStats, GameStatus, PatternMatchStats, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Interval;

pub const START_SECS: u32 = 60;
pub const OPTION_COUNT: usize = 4;
pub const COLORS: [&str; 6] = ["red", "blue", "green", "yellow", "purple", "pink"];
pub const SHAPES: [&str; 5] = ["circle", "square", "triangle", "diamond", "star"];

const CORRECT_PER_LEVEL: u32 = 5;
const CORRECT_BONUS_SECS: u32 = 2;
const LEVEL_UP_BONUS_SECS: u32 = 10;
const WRONG_PENALTY_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternItem {
    pub color: &'static str,
    pub shape: &'static str,
}

pub type Pattern = Vec<PatternItem>;

/// Items in the target sequence at `level`.
pub fn pattern_len(level: u32) -> usize {
    (2 + level as usize / 2).min(5)
}

/// Attribute changes applied to each decoy at `level`.
pub fn decoy_changes(level: u32) -> usize {
    (1 + level as usize / 4).min(2)
}

fn pick<R: Rng>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or("")
}

fn pick_other<R: Rng>(pool: &[&'static str], current: &str, rng: &mut R) -> &'static str {
    let others: Vec<&'static str> = pool.iter().copied().filter(|v| *v != current).collect();
    pick(&others, rng)
}

fn random_pattern<R: Rng>(len: usize, rng: &mut R) -> Pattern {
    (0..len)
        .map(|_| PatternItem {
            color: pick(&COLORS, rng),
            shape: pick(&SHAPES, rng),
        })
        .collect()
}

fn decoy<R: Rng>(target: &[PatternItem], changes: usize, rng: &mut R) -> Pattern {
    loop {
        let mut option = target.to_vec();
        for _ in 0..changes {
            let index = rng.gen_range(0..option.len());
            let item = &mut option[index];
            if rng.gen_bool(0.5) {
                item.color = pick_other(&COLORS, item.color, rng);
            } else {
                item.shape = pick_other(&SHAPES, item.shape, rng);
            }
        }
        if option != target {
            return option;
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternMatch {
    status: GameStatus,
    level: u32,
    score: u32,
    correct_answers: u32,
    time_left: u32,
    target: Pattern,
    options: Vec<Pattern>,
    correct_index: usize,
    ticker: Interval,
    rng: Pcg64Mcg,
}

impl Default for PatternMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatch {
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
            correct_answers: 0,
            time_left: START_SECS,
            target: Vec::new(),
            options: Vec::new(),
            correct_index: 0,
            ticker: Interval::new(TICK_MS),
            rng,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn target(&self) -> &[PatternItem] {
        &self.target
    }

    pub fn options(&self) -> &[Pattern] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.status = GameStatus::Playing;
        self.level = 1;
        self.score = 0;
        self.correct_answers = 0;
        self.time_left = START_SECS;
        self.new_pattern();
        self.ticker.start(now_ms);
        vec![GameEvent::Started]
    }

    pub fn select(&mut self, option: usize) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        if option >= self.options.len() {
            return Err(GameError::OutOfBounds {
                index: option,
                len: self.options.len(),
            });
        }

        if option != self.correct_index {
            self.time_left = self.time_left.saturating_sub(WRONG_PENALTY_SECS).max(1);
            return Ok(vec![GameEvent::Incorrect { expected: None }]);
        }

        let points = 10 * self.level;
        self.score += points;
        self.correct_answers += 1;
        let mut events = vec![GameEvent::Correct { points }];
        if self.correct_answers % CORRECT_PER_LEVEL == 0 {
            self.level += 1;
            self.time_left = (self.time_left + LEVEL_UP_BONUS_SECS).min(START_SECS);
            events.push(GameEvent::LevelUp { level: self.level });
        } else {
            self.time_left = (self.time_left + CORRECT_BONUS_SECS).min(START_SECS);
        }
        self.new_pattern();
        Ok(events)
    }

    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return Vec::new();
        }
        self.status = GameStatus::Finished;
        self.ticker.stop();
        vec![GameEvent::TimeUp, GameEvent::Finished]
    }

    fn new_pattern(&mut self) {
        let target = random_pattern(pattern_len(self.level), &mut self.rng);
        let changes = decoy_changes(self.level);

        let mut options = vec![target.clone()];
        for _ in 1..OPTION_COUNT {
            options.push(decoy(&target, changes, &mut self.rng));
        }
        options.shuffle(&mut self.rng);

        self.correct_index = options.iter().position(|o| *o == target).unwrap_or(0);
        self.options = options;
        self.target = target;
    }
}

impl GameMachine for PatternMatch {
    fn game_id(&self) -> GameId {
        GameId::PatternMatch
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
        PatternMatchStats {
            score: self.score,
            level: self.level,
            correct_answers: self.correct_answers,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.ticker.stop();
    }
}
