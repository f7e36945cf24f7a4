//! 4-7-8 breathing pacer.
//!
//! ```text
//! Inhale(4s) -> Hold(7s) -> Exhale(8s) -> Rest(2s) -> Inhale ...
//! ```
//!
//! Every phase lasts exactly its duration in ticks. The Rest -> Inhale edge
//! completes a cycle; after `target_cycles` cycles the pacer is finished.

use serde::{Deserialize, Serialize};

use super::{BreathingStats, GameId, GameMachine, GameStats, GameStatus, TICK_MS};
use crate::events::GameEvent;
use crate::timer::Interval;

pub const DEFAULT_TARGET_CYCLES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl BreathPhase {
    pub fn duration_secs(&self) -> u32 {
        match self {
            BreathPhase::Inhale => 4,
            BreathPhase::Hold => 7,
            BreathPhase::Exhale => 8,
            BreathPhase::Rest => 2,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in slowly...",
            BreathPhase::Hold => "Hold your breath...",
            BreathPhase::Exhale => "Breathe out slowly...",
            BreathPhase::Rest => "Relax...",
        }
    }

    fn next(&self) -> BreathPhase {
        match self {
            BreathPhase::Inhale => BreathPhase::Hold,
            BreathPhase::Hold => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Rest,
            BreathPhase::Rest => BreathPhase::Inhale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BreathingPacer {
    status: GameStatus,
    phase: BreathPhase,
    seconds_left: u32,
    cycles_completed: u32,
    total_time_spent: u32,
    target_cycles: u32,
    ticker: Interval,
}

impl Default for BreathingPacer {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingPacer {
    pub fn new() -> Self {
        Self::with_target_cycles(DEFAULT_TARGET_CYCLES)
    }

    pub fn with_target_cycles(target_cycles: u32) -> Self {
        Self {
            status: GameStatus::Idle,
            phase: BreathPhase::Inhale,
            seconds_left: BreathPhase::Inhale.duration_secs(),
            cycles_completed: 0,
            total_time_spent: 0,
            target_cycles: target_cycles.max(1),
            ticker: Interval::new(TICK_MS),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn total_time_spent(&self) -> u32 {
        self.total_time_spent
    }

    pub fn target_cycles(&self) -> u32 {
        self.target_cycles
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase.duration_secs() as f64;
        1.0 - (self.seconds_left as f64 / total)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start, or resume after a pause.
    pub fn start(&mut self, now_ms: u64) -> Option<GameEvent> {
        let event = match self.status {
            GameStatus::Idle => GameEvent::Started,
            GameStatus::Paused => GameEvent::Resumed,
            GameStatus::Playing | GameStatus::Finished => return None,
        };
        self.status = GameStatus::Playing;
        self.ticker.start(now_ms);
        Some(event)
    }

    pub fn pause(&mut self) -> Option<GameEvent> {
        if self.status != GameStatus::Playing {
            return None;
        }
        self.status = GameStatus::Paused;
        self.ticker.stop();
        Some(GameEvent::Paused)
    }

    pub fn reset(&mut self) -> GameEvent {
        *self = Self::with_target_cycles(self.target_cycles);
        GameEvent::Reset
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        self.total_time_spent += 1;

        if self.seconds_left > 1 {
            self.seconds_left -= 1;
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.phase == BreathPhase::Rest {
            self.cycles_completed += 1;
            events.push(GameEvent::CycleCompleted {
                cycles: self.cycles_completed,
            });
            if self.cycles_completed >= self.target_cycles {
                self.seconds_left = 0;
                self.status = GameStatus::Finished;
                self.ticker.stop();
                events.push(GameEvent::Finished);
                return events;
            }
        }

        self.phase = self.phase.next();
        self.seconds_left = self.phase.duration_secs();
        events.push(GameEvent::BreathPhaseChanged { phase: self.phase });
        events
    }
}

impl GameMachine for BreathingPacer {
    fn game_id(&self) -> GameId {
        GameId::Breathing
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
        BreathingStats {
            cycles_completed: self.cycles_completed,
            total_time_spent: self.total_time_spent,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.ticker.stop();
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE_SECS: u32 = 4 + 7 + 8 + 2;

    #[test]
    fn phases_last_their_duration() {
        let mut pacer = BreathingPacer::new();
        pacer.start(0);
        for _ in 0..3 {
            assert!(pacer.tick().is_empty());
        }
        assert_eq!(pacer.phase(), BreathPhase::Inhale);
        assert_eq!(
            pacer.tick(),
            vec![GameEvent::BreathPhaseChanged {
                phase: BreathPhase::Hold
            }]
        );
        assert_eq!(pacer.seconds_left(), 7);
    }

    #[test]
    fn three_cycles_finish_the_exercise() {
        let mut pacer = BreathingPacer::new();
        pacer.start(0);
        for _ in 0..(3 * CYCLE_SECS - 1) {
            pacer.tick();
        }
        assert_eq!(pacer.status(), GameStatus::Playing);
        assert_eq!(pacer.cycles_completed(), 2);

        let events = pacer.tick();
        assert!(events.contains(&GameEvent::Finished));
        assert_eq!(pacer.status(), GameStatus::Finished);
        assert_eq!(pacer.cycles_completed(), 3);
        assert_eq!(pacer.total_time_spent(), 3 * CYCLE_SECS);
    }

    #[test]
    fn finished_pacer_ignores_ticks() {
        let mut pacer = BreathingPacer::with_target_cycles(1);
        pacer.start(0);
        for _ in 0..CYCLE_SECS {
            pacer.tick();
        }
        assert!(pacer.is_finished());
        assert!(pacer.tick().is_empty());
        assert_eq!(pacer.total_time_spent(), CYCLE_SECS);
    }

    #[test]
    fn pause_stops_time() {
        let mut pacer = BreathingPacer::new();
        pacer.start(0);
        pacer.poll(2_000);
        assert_eq!(pacer.total_time_spent(), 2);

        assert_eq!(pacer.pause(), Some(GameEvent::Paused));
        assert!(pacer.poll(60_000).is_empty());
        assert_eq!(pacer.total_time_spent(), 2);

        assert_eq!(pacer.start(60_000), Some(GameEvent::Resumed));
        pacer.poll(61_000);
        assert_eq!(pacer.total_time_spent(), 3);
    }

    #[test]
    fn poll_catches_up_missed_ticks() {
        let mut pacer = BreathingPacer::new();
        pacer.start(10_000);
        let events = pacer.poll(10_000 + 5_000);
        assert_eq!(pacer.total_time_spent(), 5);
        assert_eq!(pacer.phase(), BreathPhase::Hold);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut pacer = BreathingPacer::new();
        pacer.start(0);
        pacer.poll(30_000);
        pacer.reset();
        assert_eq!(pacer.status(), GameStatus::Idle);
        assert_eq!(pacer.cycles_completed(), 0);
        assert_eq!(pacer.seconds_left(), 4);
        assert!(pacer.poll(90_000).is_empty());
    }

    #[test]
    fn partial_exit_reports_abandoned() {
        let mut pacer = BreathingPacer::new();
        pacer.start(0);
        pacer.poll(25_000);
        pacer.stop_timers();
        let outcome = pacer.outcome();
        assert_eq!(outcome.completed, Some(false));
        assert_eq!(
            outcome.stats,
            Some(GameStats::Breathing(BreathingStats {
                cycles_completed: 1,
                total_time_spent: 25
            }))
        );
    }
}
