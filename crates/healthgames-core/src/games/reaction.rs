//! Reaction-time test.
//!
//! ```text
//! Idle -> Countdown(3s) -> Armed(random 1-5s) -> Ready -> Clicked -> Countdown ...
//!                                                      \-> Results (after 5 attempts)
//! ```
//!
//! Clicking before `Ready` is a false start: the scheduled go signal is
//! cancelled and the countdown starts over without recording an attempt.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::{GameId, GameMachine, GameStats, GameStatus, ReactionStats, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::{Interval, Scheduled};

pub const DEFAULT_ATTEMPTS: usize = 5;
pub const COUNTDOWN_SECS: u32 = 3;
const MIN_DELAY_MS: u64 = 1_000;
const MAX_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionPhase {
    Idle,
    /// "Get ready..." countdown before the random delay.
    Countdown { remaining: u32 },
    /// Waiting for the randomly delayed go signal.
    Armed,
    Ready { since_ms: u64 },
    Clicked { elapsed_ms: u64 },
    Results,
}

#[derive(Debug, Clone)]
pub struct ReactionTimer {
    phase: ReactionPhase,
    attempts: Vec<u64>,
    max_attempts: usize,
    countdown: Interval,
    go_signal: Scheduled<()>,
    rng: Pcg64Mcg,
}

impl Default for ReactionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactionTimer {
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        Self {
            phase: ReactionPhase::Idle,
            attempts: Vec::new(),
            max_attempts: DEFAULT_ATTEMPTS,
            countdown: Interval::new(TICK_MS),
            go_signal: Scheduled::new(),
            rng,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    pub fn attempts(&self) -> &[u64] {
        &self.attempts
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn best_time(&self) -> Option<u64> {
        self.attempts.iter().copied().min()
    }

    pub fn average_time(&self) -> Option<f64> {
        if self.attempts.is_empty() {
            return None;
        }
        Some(self.attempts.iter().sum::<u64>() as f64 / self.attempts.len() as f64)
    }

    /// True while the go signal is scheduled but has not fired.
    pub fn has_pending_signal(&self) -> bool {
        self.go_signal.is_pending()
    }

    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.attempts.clear();
        vec![self.begin_countdown(now_ms)]
    }

    /// The single player input.
    pub fn click(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        match self.phase {
            ReactionPhase::Idle => Ok(self.start(now_ms)),
            ReactionPhase::Countdown { .. } | ReactionPhase::Armed => {
                Ok(vec![GameEvent::FalseStart, self.begin_countdown(now_ms)])
            }
            ReactionPhase::Ready { since_ms } => {
                let elapsed_ms = now_ms.saturating_sub(since_ms);
                self.attempts.push(elapsed_ms);
                let mut events = vec![GameEvent::ReactionRecorded {
                    elapsed_ms,
                    attempt: self.attempts.len(),
                }];
                if self.attempts.len() >= self.max_attempts {
                    self.phase = ReactionPhase::Results;
                    self.stop_timers();
                    events.push(GameEvent::Finished);
                } else {
                    self.phase = ReactionPhase::Clicked { elapsed_ms };
                }
                Ok(events)
            }
            ReactionPhase::Clicked { .. } => Ok(vec![self.begin_countdown(now_ms)]),
            ReactionPhase::Results => Err(GameError::NotPlaying),
        }
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let ReactionPhase::Countdown { remaining } = self.phase else {
            return Vec::new();
        };
        if remaining > 1 {
            self.phase = ReactionPhase::Countdown {
                remaining: remaining - 1,
            };
            return Vec::new();
        }
        self.countdown.stop();
        let delay = self.rng.gen_range(MIN_DELAY_MS..MAX_DELAY_MS);
        self.go_signal.schedule(now_ms + delay, ());
        self.phase = ReactionPhase::Armed;
        vec![GameEvent::Armed]
    }

    fn begin_countdown(&mut self, now_ms: u64) -> GameEvent {
        self.go_signal.cancel();
        self.countdown.start(now_ms);
        self.phase = ReactionPhase::Countdown {
            remaining: COUNTDOWN_SECS,
        };
        GameEvent::CountdownStarted {
            seconds: COUNTDOWN_SECS,
        }
    }
}

impl GameMachine for ReactionTimer {
    fn game_id(&self) -> GameId {
        GameId::Reaction
    }

    fn status(&self) -> GameStatus {
        match self.phase {
            ReactionPhase::Idle => GameStatus::Idle,
            ReactionPhase::Results => GameStatus::Finished,
            _ => GameStatus::Playing,
        }
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while self.countdown.due(now_ms) {
            events.extend(self.tick(now_ms));
        }
        if self.phase == ReactionPhase::Armed && self.go_signal.take_due(now_ms).is_some() {
            self.phase = ReactionPhase::Ready { since_ms: now_ms };
            events.push(GameEvent::Ready);
        }
        events
    }

    fn stats(&self) -> GameStats {
        ReactionStats {
            best_time: self.best_time(),
            average_time: self.average_time(),
            attempts: self.attempts.clone(),
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.countdown.stop();
        self.go_signal.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the timer from a fresh countdown to `Ready`, returning the
    /// timestamp at which the go signal fired.
    fn run_to_ready(timer: &mut ReactionTimer, mut now: u64) -> u64 {
        for _ in 0..COUNTDOWN_SECS {
            now += TICK_MS;
            timer.poll(now);
        }
        assert_eq!(timer.phase(), ReactionPhase::Armed);
        loop {
            now += 100;
            if timer.poll(now).contains(&GameEvent::Ready) {
                return now;
            }
            assert!(now < 100_000, "go signal never fired");
        }
    }

    #[test]
    fn countdown_arms_after_three_seconds() {
        let mut timer = ReactionTimer::with_seed(7);
        timer.start(0);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 3 });
        timer.poll(2_000);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 1 });
        assert_eq!(timer.poll(3_000), vec![GameEvent::Armed]);
        assert!(timer.has_pending_signal());
    }

    #[test]
    fn go_signal_delay_is_between_one_and_five_seconds() {
        for seed in 0..50 {
            let mut timer = ReactionTimer::with_seed(seed);
            timer.start(0);
            let ready_at = run_to_ready(&mut timer, 0);
            let delay = ready_at - 3_000;
            assert!((1_000..=5_000).contains(&delay), "delay {delay}");
        }
    }

    #[test]
    fn early_click_is_a_false_start() {
        let mut timer = ReactionTimer::with_seed(1);
        timer.start(0);
        timer.poll(3_000);
        assert_eq!(timer.phase(), ReactionPhase::Armed);

        let events = timer.click(3_200).unwrap();
        assert_eq!(events[0], GameEvent::FalseStart);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 3 });
        assert!(timer.attempts().is_empty());
        assert!(!timer.has_pending_signal());

        // The cancelled signal must not fire once its old deadline passes.
        assert!(!timer.poll(3_200 + 2_999).contains(&GameEvent::Ready));
        assert!(matches!(timer.phase(), ReactionPhase::Countdown { .. }));
    }

    #[test]
    fn click_during_countdown_restarts_it() {
        let mut timer = ReactionTimer::with_seed(4);
        timer.start(0);
        timer.poll(1_500);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 2 });

        let events = timer.click(1_500).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::FalseStart, GameEvent::CountdownStarted { seconds: 3 }]
        );
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 3 });
        assert!(!timer.has_pending_signal());
        assert!(timer.attempts().is_empty());

        // The restarted countdown runs from the click, not from the start.
        timer.poll(2_400);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 3 });
        timer.poll(2_500);
        assert_eq!(timer.phase(), ReactionPhase::Countdown { remaining: 2 });
    }

    #[test]
    fn five_attempts_finish_the_test() {
        let mut timer = ReactionTimer::with_seed(3);
        let mut now = 0;
        timer.start(now);
        for n in 1..=5u64 {
            now = run_to_ready(&mut timer, now);
            now += 200 + n;
            let events = timer.click(now).unwrap();
            assert!(timer.attempts().len() <= 5);
            if n < 5 {
                assert_eq!(timer.status(), GameStatus::Playing);
                timer.click(now).unwrap();
            } else {
                assert!(events.contains(&GameEvent::Finished));
            }
        }
        assert_eq!(timer.status(), GameStatus::Finished);
        assert_eq!(timer.attempts(), &[201, 202, 203, 204, 205]);
        assert_eq!(timer.best_time(), Some(201));
        assert_eq!(timer.average_time(), Some(203.0));
        assert_eq!(timer.click(now + 1), Err(GameError::NotPlaying));
    }

    #[test]
    fn exit_reports_partial_attempts() {
        let mut timer = ReactionTimer::with_seed(9);
        timer.start(0);
        let now = run_to_ready(&mut timer, 0);
        timer.click(now + 250).unwrap();
        timer.stop_timers();

        let outcome = timer.outcome();
        assert_eq!(outcome.completed, Some(false));
        match outcome.stats {
            Some(GameStats::Reaction(stats)) => {
                assert_eq!(stats.attempts, vec![250]);
                assert_eq!(stats.best_time, Some(250));
            }
            other => panic!("unexpected stats: {other:?}"),
        }
    }
}
