//! Musical memory: listen to a growing note sequence and play it back.
//!
//! Playback is a queue of delayed steps drained one at a time:
//!
//! ```text
//! lead-in(1000) -> on(C) -500+300-> off(C) -100-> on(E) ... off(last) -100-> your turn
//! ```
//!
//! Player input is refused while any step is pending.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::{GameId, GameMachine, GameStats, GameStatus, MusicStats};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Scheduled;

pub const LEAD_IN_MS: u64 = 1_000;
pub const NOTE_MS: u64 = 500;
pub const GAP_MS: u64 = 300;
pub const PAUSE_MS: u64 = 100;
/// Delay before the next level (after a completed sequence).
pub const NEXT_LEVEL_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub name: &'static str,
    pub frequency_hz: f64,
}

pub const NOTES: [Note; 4] = [
    Note {
        name: "C",
        frequency_hz: 261.63,
    },
    Note {
        name: "D",
        frequency_hz: 293.66,
    },
    Note {
        name: "E",
        frequency_hz: 329.63,
    },
    Note {
        name: "G",
        frequency_hz: 392.00,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicMode {
    /// Notes just sound; nothing is scored.
    Free,
    /// A wrong note replays the sequence.
    Memory,
    /// A wrong note ends the game.
    Repeat,
}

impl fmt::Display for MusicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MusicMode::Free => "free",
            MusicMode::Memory => "memory",
            MusicMode::Repeat => "repeat",
        };
        f.write_str(s)
    }
}

impl FromStr for MusicMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(MusicMode::Free),
            "memory" => Ok(MusicMode::Memory),
            "repeat" | "challenge" => Ok(MusicMode::Repeat),
            other => Err(GameError::InvalidInput(format!("unknown music mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Append a note and queue playback.
    NextLevel,
    NoteOn(usize),
    NoteOff(usize),
    /// Playback finished.
    Done,
}

#[derive(Debug, Clone)]
pub struct MusicalMemory {
    status: GameStatus,
    mode: MusicMode,
    level: u32,
    sequence: Vec<usize>,
    player: Vec<usize>,
    queue: VecDeque<(u64, Step)>,
    next_step: Scheduled<Step>,
    rng: Pcg64Mcg,
}

impl Default for MusicalMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicalMemory {
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        Self {
            status: GameStatus::Idle,
            mode: MusicMode::Free,
            level: 1,
            sequence: Vec::new(),
            player: Vec::new(),
            queue: VecDeque::new(),
            next_step: Scheduled::new(),
            rng,
        }
    }

    pub fn mode(&self) -> MusicMode {
        self.mode
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn player_sequence(&self) -> &[usize] {
        &self.player
    }

    pub fn is_playing_back(&self) -> bool {
        self.next_step.is_pending()
    }

    pub fn start(&mut self, mode: MusicMode, now_ms: u64) -> Vec<GameEvent> {
        self.clear_playback();
        self.status = GameStatus::Playing;
        self.mode = mode;
        self.level = 1;
        self.sequence.clear();
        self.player.clear();
        if mode != MusicMode::Free {
            self.next_level(now_ms);
        }
        vec![GameEvent::Started]
    }

    /// Press one of the four notes.
    pub fn press(&mut self, note: usize, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let Some(sound) = NOTES.get(note) else {
            return Err(GameError::OutOfBounds {
                index: note,
                len: NOTES.len(),
            });
        };
        if self.is_playing_back() {
            return Err(GameError::MoveRejected("wait for the sequence to finish".into()));
        }

        let mut events = vec![GameEvent::NoteStarted {
            note,
            frequency_hz: sound.frequency_hz,
        }];
        if self.mode == MusicMode::Free {
            return Ok(events);
        }

        let expected = self.sequence.get(self.player.len()).copied();
        self.player.push(note);
        if expected != Some(note) {
            events.push(GameEvent::WrongSequence);
            self.player.clear();
            match self.mode {
                MusicMode::Repeat => {
                    self.status = GameStatus::Finished;
                    self.clear_playback();
                    events.push(GameEvent::Finished);
                }
                _ => self.queue_playback(now_ms),
            }
            return Ok(events);
        }

        if self.player.len() == self.sequence.len() {
            self.level += 1;
            events.push(GameEvent::LevelUp { level: self.level });
            self.queue.clear();
            self.next_step
                .schedule(now_ms + NEXT_LEVEL_DELAY_MS, Step::NextLevel);
        }
        Ok(events)
    }

    /// Play the current sequence again without the lead-in.
    pub fn replay(&mut self, now_ms: u64) -> Result<(), GameError> {
        if self.status != GameStatus::Playing || self.mode == MusicMode::Free {
            return Err(GameError::NotPlaying);
        }
        if self.is_playing_back() {
            return Err(GameError::MoveRejected("sequence is already playing".into()));
        }
        self.player.clear();
        self.build_queue(0);
        self.advance_queue(now_ms);
        Ok(())
    }

    fn next_level(&mut self, now_ms: u64) {
        let note = self.rng.gen_range(0..NOTES.len());
        self.sequence.push(note);
        self.player.clear();
        self.queue_playback(now_ms);
    }

    fn queue_playback(&mut self, now_ms: u64) {
        self.build_queue(LEAD_IN_MS);
        self.advance_queue(now_ms);
    }

    fn build_queue(&mut self, lead_in_ms: u64) {
        self.queue.clear();
        let mut delay = lead_in_ms;
        for &note in &self.sequence {
            self.queue.push_back((delay, Step::NoteOn(note)));
            self.queue.push_back((NOTE_MS + GAP_MS, Step::NoteOff(note)));
            delay = PAUSE_MS;
        }
        self.queue.push_back((PAUSE_MS, Step::Done));
    }

    /// Schedule the next queued step relative to `from_ms`.
    fn advance_queue(&mut self, from_ms: u64) {
        if let Some((delay, step)) = self.queue.pop_front() {
            self.next_step.schedule(from_ms + delay, step);
        }
    }

    fn clear_playback(&mut self) {
        self.queue.clear();
        self.next_step.cancel();
    }

    fn run_step(&mut self, step: Step, at_ms: u64) -> Option<GameEvent> {
        match step {
            Step::NextLevel => {
                self.next_level(at_ms);
                None
            }
            Step::NoteOn(note) => {
                self.advance_queue(at_ms);
                Some(GameEvent::NoteStarted {
                    note,
                    frequency_hz: NOTES[note].frequency_hz,
                })
            }
            Step::NoteOff(note) => {
                self.advance_queue(at_ms);
                Some(GameEvent::NoteStopped { note })
            }
            Step::Done => Some(GameEvent::YourTurn {
                length: self.sequence.len(),
            }),
        }
    }
}

impl GameMachine for MusicalMemory {
    fn game_id(&self) -> GameId {
        GameId::MusicTherapy
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.next_step.due_at() {
            let Some(step) = self.next_step.take_due(now_ms) else {
                break;
            };
            events.extend(self.run_step(step, due));
        }
        events
    }

    fn stats(&self) -> GameStats {
        MusicStats {
            mode: self.mode,
            level: self.level,
            sequence_length: self.sequence.len() as u32,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.clear_playback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Poll until the player's turn, returning its timestamp.
    fn wait_for_turn(game: &mut MusicalMemory, mut now: u64) -> u64 {
        loop {
            now += 50;
            let events = game.poll(now);
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::YourTurn { .. }))
            {
                return now;
            }
            assert!(now < 120_000, "playback never finished");
        }
    }

    fn play_back(game: &mut MusicalMemory, now: u64) -> Vec<GameEvent> {
        let sequence = game.sequence().to_vec();
        let mut events = Vec::new();
        for note in sequence {
            events.extend(game.press(note, now).unwrap());
        }
        events
    }

    #[test]
    fn playback_follows_note_timing() {
        let mut game = MusicalMemory::with_seed(1);
        game.start(MusicMode::Memory, 0);
        let note = game.sequence()[0];
        assert!(game.is_playing_back());

        assert!(game.poll(999).is_empty());
        assert_eq!(
            game.poll(1_000),
            vec![GameEvent::NoteStarted {
                note,
                frequency_hz: NOTES[note].frequency_hz
            }]
        );
        assert!(game.poll(1_799).is_empty());
        assert_eq!(game.poll(1_800), vec![GameEvent::NoteStopped { note }]);
        assert_eq!(game.poll(1_900), vec![GameEvent::YourTurn { length: 1 }]);
        assert!(!game.is_playing_back());
    }

    #[test]
    fn late_poll_drains_every_step_in_order() {
        let mut game = MusicalMemory::with_seed(2);
        game.start(MusicMode::Memory, 0);
        let events = game.poll(10_000);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], GameEvent::YourTurn { length: 1 }));
    }

    #[test]
    fn input_is_refused_during_playback() {
        let mut game = MusicalMemory::with_seed(3);
        game.start(MusicMode::Memory, 0);
        assert!(matches!(game.press(0, 500), Err(GameError::MoveRejected(_))));
        assert!(game.player_sequence().is_empty());
    }

    #[test]
    fn completed_sequence_grows_the_next_level() {
        let mut game = MusicalMemory::with_seed(4);
        game.start(MusicMode::Memory, 0);
        let now = wait_for_turn(&mut game, 0);

        let events = play_back(&mut game, now);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(game.sequence().len(), 1);
        assert!(game.is_playing_back());

        game.poll(now + NEXT_LEVEL_DELAY_MS);
        assert_eq!(game.sequence().len(), 2);
        let now = wait_for_turn(&mut game, now + NEXT_LEVEL_DELAY_MS);
        play_back(&mut game, now);
        assert_eq!(game.level(), 3);
    }

    #[test]
    fn memory_mode_replays_after_a_mistake() {
        let mut game = MusicalMemory::with_seed(5);
        game.start(MusicMode::Memory, 0);
        let now = wait_for_turn(&mut game, 0);
        let wrong = (game.sequence()[0] + 1) % NOTES.len();

        let events = game.press(wrong, now).unwrap();
        assert!(events.contains(&GameEvent::WrongSequence));
        assert_eq!(game.status(), GameStatus::Playing);
        assert!(game.is_playing_back());
        assert_eq!(game.sequence().len(), 1);
        assert!(game.poll(now + 999).is_empty());
        assert!(matches!(
            game.poll(now + 1_000)[0],
            GameEvent::NoteStarted { .. }
        ));
    }

    #[test]
    fn repeat_mode_ends_on_a_mistake() {
        let mut game = MusicalMemory::with_seed(6);
        game.start(MusicMode::Repeat, 0);
        let now = wait_for_turn(&mut game, 0);
        let wrong = (game.sequence()[0] + 1) % NOTES.len();

        let events = game.press(wrong, now).unwrap();
        assert!(events.ends_with(&[GameEvent::WrongSequence, GameEvent::Finished]));
        assert!(game.is_finished());
        assert_eq!(
            game.stats(),
            GameStats::MusicTherapy(MusicStats {
                mode: MusicMode::Repeat,
                level: 1,
                sequence_length: 1
            })
        );
    }

    #[test]
    fn free_play_only_sounds_notes() {
        let mut game = MusicalMemory::with_seed(7);
        game.start(MusicMode::Free, 0);
        assert!(!game.is_playing_back());
        let events = game.press(3, 10).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::NoteStarted {
                note: 3,
                frequency_hz: 392.0
            }]
        );
        assert!(game.sequence().is_empty());
        assert_eq!(
            game.press(4, 10),
            Err(GameError::OutOfBounds { index: 4, len: 4 })
        );
    }

    #[test]
    fn mode_parses_challenge_alias() {
        assert_eq!("challenge".parse::<MusicMode>().unwrap(), MusicMode::Repeat);
        assert_eq!(serde_json::to_value(MusicMode::Repeat).unwrap(), "repeat");
    }
}
