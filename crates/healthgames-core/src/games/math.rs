//! Mental math against a 30 second clock.
//!
//! Correct answers buy time back, wrong ones cost time. The difficulty
//! climbs one level per five correct answers.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::{GameId, GameMachine, GameStats, GameStatus, MathChallengeStats, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Interval;

pub const START_SECS: u32 = 30;
pub const MAX_LEVEL: u32 = 5;
const CORRECT_BONUS_SECS: u32 = 2;
const WRONG_PENALTY_SECS: u32 = 3;
const CORRECT_PER_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub left: i64,
    pub op: Operator,
    pub right: i64,
    pub answer: i64,
}

impl Problem {
    fn new(left: i64, op: Operator, right: i64) -> Self {
        let answer = match op {
            Operator::Add => left + right,
            Operator::Sub => left - right,
            Operator::Mul => left * right,
            Operator::Div => left / right,
        };
        Self {
            left,
            op,
            right,
            answer,
        }
    }

    /// Generate a problem for `level`. Divisions are always exact.
    pub fn generate<R: Rng>(level: u32, rng: &mut R) -> Self {
        match level {
            0 | 1 => {
                let mut a = rng.gen_range(1..=10);
                let mut b = rng.gen_range(1..=10);
                let op = plus_or_minus(rng);
                if op == Operator::Sub && b > a {
                    std::mem::swap(&mut a, &mut b);
                }
                Self::new(a, op, b)
            }
            2 => {
                let a = rng.gen_range(10..=29);
                let b = rng.gen_range(1..=20);
                Self::new(a, plus_or_minus(rng), b)
            }
            3 => {
                if rng.gen_bool(0.7) {
                    Self::new(rng.gen_range(1..=10), Operator::Mul, rng.gen_range(1..=10))
                } else {
                    let a = rng.gen_range(10..=39);
                    let b = rng.gen_range(1..=30);
                    Self::new(a, plus_or_minus(rng), b)
                }
            }
            4 => {
                if rng.gen_bool(0.5) {
                    Self::product_or_quotient(
                        rng.gen_range(1..=12),
                        rng.gen_range(1..=12),
                        times_or_divide(rng),
                    )
                } else {
                    let a = rng.gen_range(10..=59);
                    let b = rng.gen_range(1..=50);
                    Self::new(a, plus_or_minus(rng), b)
                }
            }
            _ => {
                if rng.gen_bool(0.7) {
                    Self::product_or_quotient(
                        rng.gen_range(5..=24),
                        rng.gen_range(2..=11),
                        times_or_divide(rng),
                    )
                } else {
                    let a = rng.gen_range(20..=119);
                    let b = rng.gen_range(1..=100);
                    Self::new(a, plus_or_minus(rng), b)
                }
            }
        }
    }

    fn product_or_quotient(a: i64, b: i64, op: Operator) -> Self {
        match op {
            Operator::Div => Self::new(a * b, Operator::Div, b),
            _ => Self::new(a, Operator::Mul, b),
        }
    }
}

fn plus_or_minus<R: Rng>(rng: &mut R) -> Operator {
    if rng.gen_bool(0.5) {
        Operator::Add
    } else {
        Operator::Sub
    }
}

fn times_or_divide<R: Rng>(rng: &mut R) -> Operator {
    if rng.gen_bool(0.5) {
        Operator::Mul
    } else {
        Operator::Div
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} = ?", self.left, self.op.symbol(), self.right)
    }
}

/// Whole-number accuracy percentage; 0 when nothing was answered.
pub fn accuracy(correct: u32, incorrect: u32) -> u32 {
    let total = correct + incorrect;
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

#[derive(Debug, Clone)]
pub struct MentalMath {
    status: GameStatus,
    score: u32,
    level: u32,
    time_left: u32,
    problem: Problem,
    correct_answers: u32,
    incorrect_answers: u32,
    ticker: Interval,
    rng: Pcg64Mcg,
}

impl Default for MentalMath {
    fn default() -> Self {
        Self::new()
    }
}

impl MentalMath {
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        Self {
            status: GameStatus::Idle,
            score: 0,
            level: 1,
            time_left: START_SECS,
            problem: Problem::new(0, Operator::Add, 0),
            correct_answers: 0,
            incorrect_answers: 0,
            ticker: Interval::new(TICK_MS),
            rng,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn incorrect_answers(&self) -> u32 {
        self.incorrect_answers
    }

    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.level = 1;
        self.time_left = START_SECS;
        self.correct_answers = 0;
        self.incorrect_answers = 0;
        self.problem = Problem::generate(self.level, &mut self.rng);
        self.ticker.start(now_ms);
        vec![GameEvent::Started]
    }

    /// Check a typed answer.
    ///
    /// Input that does not parse as a number is rejected without touching
    /// any counters.
    pub fn answer(&mut self, input: &str) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let value: f64 = input
            .trim()
            .parse()
            .map_err(|_| GameError::InvalidInput(format!("not a number: {input:?}")))?;
        if !value.is_finite() {
            return Err(GameError::InvalidInput(format!("not a number: {input:?}")));
        }

        let mut events = Vec::new();
        if value == self.problem.answer as f64 {
            let points = 10 * self.level;
            self.score += points;
            self.correct_answers += 1;
            self.time_left = (self.time_left + CORRECT_BONUS_SECS).min(START_SECS);
            events.push(GameEvent::Correct { points });
            if self.correct_answers % CORRECT_PER_LEVEL == 0 && self.level < MAX_LEVEL {
                self.level += 1;
                events.push(GameEvent::LevelUp { level: self.level });
            }
        } else {
            self.incorrect_answers += 1;
            self.time_left = self.time_left.saturating_sub(WRONG_PENALTY_SECS).max(1);
            events.push(GameEvent::Incorrect {
                expected: Some(self.problem.answer.to_string()),
            });
        }
        self.problem = Problem::generate(self.level, &mut self.rng);
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
}

impl GameMachine for MentalMath {
    fn game_id(&self) -> GameId {
        GameId::MathChallenge
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
        MathChallengeStats {
            score: self.score,
            level: self.level,
            correct_answers: self.correct_answers,
            incorrect_answers: self.incorrect_answers,
            accuracy: accuracy(self.correct_answers, self.incorrect_answers),
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.ticker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer_right(game: &mut MentalMath) -> Vec<GameEvent> {
        let answer = game.problem().answer.to_string();
        game.answer(&answer).unwrap()
    }

    #[test]
    fn level_one_never_goes_negative() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        for _ in 0..500 {
            let problem = Problem::generate(1, &mut rng);
            assert!(problem.answer >= 0, "{problem}");
            assert!(matches!(problem.op, Operator::Add | Operator::Sub));
            assert!((1..=10).contains(&problem.left) && (1..=10).contains(&problem.right));
        }
    }

    #[test]
    fn divisions_are_exact() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        for level in [4, 5] {
            for _ in 0..500 {
                let problem = Problem::generate(level, &mut rng);
                if problem.op == Operator::Div {
                    assert_eq!(problem.left % problem.right, 0, "{problem}");
                    assert_eq!(problem.answer * problem.right, problem.left);
                }
            }
        }
    }

    #[test]
    fn non_numeric_answer_changes_nothing() {
        let mut game = MentalMath::with_seed(3);
        game.start(0);
        let before = *game.problem();
        assert!(matches!(game.answer("twelve"), Err(GameError::InvalidInput(_))));
        assert!(matches!(game.answer(""), Err(GameError::InvalidInput(_))));
        assert_eq!(*game.problem(), before);
        assert_eq!((game.correct_answers(), game.incorrect_answers()), (0, 0));
        assert_eq!(game.time_left(), START_SECS);
    }

    #[test]
    fn correct_answers_score_and_level_up() {
        let mut game = MentalMath::with_seed(4);
        game.start(0);
        game.poll(5_000);
        assert_eq!(game.time_left(), 25);

        answer_right(&mut game);
        assert_eq!(game.score(), 10);
        assert_eq!(game.time_left(), 27);
        for _ in 0..3 {
            answer_right(&mut game);
        }
        let events = answer_right(&mut game);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(game.score(), 50);
        assert_eq!(game.time_left(), START_SECS);
        answer_right(&mut game);
        assert_eq!(game.score(), 70);
    }

    #[test]
    fn level_is_capped() {
        let mut game = MentalMath::with_seed(5);
        game.start(0);
        for _ in 0..40 {
            answer_right(&mut game);
        }
        assert_eq!(game.level(), MAX_LEVEL);
    }

    #[test]
    fn wrong_answer_costs_time_but_never_ends_the_game() {
        let mut game = MentalMath::with_seed(6);
        game.start(0);
        game.poll(28_000);
        assert_eq!(game.time_left(), 2);
        let wrong = (game.problem().answer + 1).to_string();
        game.answer(&wrong).unwrap();
        assert_eq!(game.time_left(), 1);
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.incorrect_answers(), 1);
    }

    #[test]
    fn timeout_finishes_with_accuracy() {
        let mut game = MentalMath::with_seed(7);
        game.start(0);
        answer_right(&mut game);
        let wrong = (game.problem().answer + 1).to_string();
        game.answer(&wrong).unwrap();
        answer_right(&mut game);

        let events = game.poll(60_000);
        assert!(events.ends_with(&[GameEvent::TimeUp, GameEvent::Finished]));
        assert!(game.is_finished());
        match game.stats() {
            GameStats::MathChallenge(stats) => {
                assert_eq!(stats.accuracy, 67);
                assert_eq!(stats.correct_answers, 2);
                assert_eq!(stats.incorrect_answers, 1);
            }
            other => panic!("unexpected stats: {other:?}"),
        }
    }

    #[test]
    fn accuracy_without_answers_is_zero() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(1, 2), 33);
    }
}
