//! Memory match: find every pair on a shuffled board.
//!
//! A second flip counts a move and schedules either a reveal (pair matched,
//! after 500 ms) or a hide (mismatch, after 1000 ms). No further flips are
//! accepted while two cards are face up.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::{GameId, GameMachine, GameStats, GameStatus, MemoryStats};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Scheduled;

pub const DEFAULT_SYMBOLS: [char; 8] = ['🌈', '🌞', '🌵', '🌸', '🍎', '🍕', '🚀', '🎮'];
pub const MATCH_DELAY_MS: u64 = 500;
pub const MISMATCH_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub value: char,
    pub flipped: bool,
    pub matched: bool,
}

impl Card {
    pub fn face_up(&self) -> bool {
        self.flipped || self.matched
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolve {
    Match(usize, usize),
    Mismatch(usize, usize),
}

#[derive(Debug, Clone)]
pub struct MemoryMatch {
    symbols: Vec<char>,
    cards: Vec<Card>,
    flipped_cards: Vec<usize>,
    moves: u32,
    matched_pairs: u32,
    finished: bool,
    match_delay_ms: u64,
    mismatch_delay_ms: u64,
    pending: Scheduled<Resolve>,
    rng: Pcg64Mcg,
}

impl Default for MemoryMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMatch {
    /// A shuffled 16-card board.
    pub fn new() -> Self {
        Self::build(DEFAULT_SYMBOLS.to_vec(), Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::build(DEFAULT_SYMBOLS.to_vec(), Pcg64Mcg::seed_from_u64(seed))
    }

    /// A board with one pair per distinct symbol. Repeated symbols are
    /// dropped, keeping the first occurrence.
    ///
    /// # Errors
    /// Returns `InvalidInput` when no symbol is given.
    pub fn with_symbols(symbols: Vec<char>, seed: u64) -> Result<Self, GameError> {
        let mut distinct = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !distinct.contains(&symbol) {
                distinct.push(symbol);
            }
        }
        if distinct.is_empty() {
            return Err(GameError::InvalidInput("memory board needs at least one symbol".into()));
        }
        Ok(Self::build(distinct, Pcg64Mcg::seed_from_u64(seed)))
    }

    fn build(symbols: Vec<char>, rng: Pcg64Mcg) -> Self {
        let mut game = Self {
            symbols,
            cards: Vec::new(),
            flipped_cards: Vec::new(),
            moves: 0,
            matched_pairs: 0,
            finished: false,
            match_delay_ms: MATCH_DELAY_MS,
            mismatch_delay_ms: MISMATCH_DELAY_MS,
            pending: Scheduled::new(),
            rng,
        };
        game.initialize();
        game
    }

    pub fn with_delays(mut self, match_delay_ms: u64, mismatch_delay_ms: u64) -> Self {
        self.match_delay_ms = match_delay_ms;
        self.mismatch_delay_ms = mismatch_delay_ms;
        self
    }

    /// Deal a fresh shuffled board and clear all progress.
    pub fn initialize(&mut self) -> GameEvent {
        self.pending.cancel();
        let mut values: Vec<char> = self
            .symbols
            .iter()
            .chain(self.symbols.iter())
            .copied()
            .collect();
        values.shuffle(&mut self.rng);

        self.cards = values
            .into_iter()
            .enumerate()
            .map(|(id, value)| Card {
                id,
                value,
                flipped: false,
                matched: false,
            })
            .collect();
        self.flipped_cards.clear();
        self.moves = 0;
        self.matched_pairs = 0;
        self.finished = false;
        GameEvent::Reset
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn flipped_cards(&self) -> &[usize] {
        &self.flipped_cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> u32 {
        self.symbols.len() as u32
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn flip(&mut self, index: usize, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        if self.finished {
            return Err(GameError::NotPlaying);
        }
        let len = self.cards.len();
        let card = self
            .cards
            .get(index)
            .ok_or(GameError::OutOfBounds { index, len })?;
        if self.flipped_cards.len() >= 2 {
            return Err(GameError::MoveRejected("two cards are already face up".into()));
        }
        if card.face_up() {
            return Err(GameError::MoveRejected(format!("card {index} is already face up")));
        }

        self.cards[index].flipped = true;
        self.flipped_cards.push(index);
        let events = vec![GameEvent::CardFlipped { index }];

        if let [first, second] = self.flipped_cards[..] {
            self.moves += 1;
            if self.cards[first].value == self.cards[second].value {
                self.pending
                    .schedule(now_ms + self.match_delay_ms, Resolve::Match(first, second));
            } else {
                self.pending.schedule(
                    now_ms + self.mismatch_delay_ms,
                    Resolve::Mismatch(first, second),
                );
            }
        }
        Ok(events)
    }

    fn resolve(&mut self, resolve: Resolve) -> Vec<GameEvent> {
        self.flipped_cards.clear();
        match resolve {
            Resolve::Match(first, second) => {
                self.cards[first].matched = true;
                self.cards[second].matched = true;
                self.matched_pairs += 1;
                let mut events = vec![GameEvent::PairMatched { first, second }];
                if self.matched_pairs == self.total_pairs() {
                    self.finished = true;
                    events.push(GameEvent::Finished);
                }
                events
            }
            Resolve::Mismatch(first, second) => {
                self.cards[first].flipped = false;
                self.cards[second].flipped = false;
                vec![GameEvent::PairMissed { first, second }]
            }
        }
    }
}

impl GameMachine for MemoryMatch {
    fn game_id(&self) -> GameId {
        GameId::Memory
    }

    fn status(&self) -> GameStatus {
        if self.finished {
            GameStatus::Finished
        } else {
            GameStatus::Playing
        }
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        match self.pending.take_due(now_ms) {
            Some(resolve) => self.resolve(resolve),
            None => Vec::new(),
        }
    }

    fn stats(&self) -> GameStats {
        MemoryStats {
            moves: self.moves,
            matched_pairs: self.matched_pairs,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.pending.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner_of(game: &MemoryMatch, index: usize) -> usize {
        let value = game.cards()[index].value;
        game.cards()
            .iter()
            .position(|c| c.id != index && c.value == value)
            .unwrap()
    }

    fn mismatch_of(game: &MemoryMatch, index: usize) -> usize {
        let value = game.cards()[index].value;
        game.cards().iter().position(|c| c.value != value).unwrap()
    }

    #[test]
    fn board_has_each_symbol_twice() {
        let game = MemoryMatch::with_seed(11);
        assert_eq!(game.cards().len(), 16);
        for symbol in DEFAULT_SYMBOLS {
            assert_eq!(game.cards().iter().filter(|c| c.value == symbol).count(), 2);
        }
        assert!(game.cards().iter().enumerate().all(|(i, c)| c.id == i));
    }

    #[test]
    fn custom_symbols_are_deduplicated_and_required() {
        assert!(matches!(
            MemoryMatch::with_symbols(Vec::new(), 1),
            Err(GameError::InvalidInput(_))
        ));

        let game = MemoryMatch::with_symbols(vec!['a', 'b', 'a'], 1).unwrap();
        assert_eq!(game.cards().len(), 4);
        assert_eq!(game.cards().iter().filter(|c| c.value == 'a').count(), 2);
    }

    #[test]
    fn matching_pair_is_revealed_after_delay() {
        let mut game = MemoryMatch::with_seed(5);
        let partner = partner_of(&game, 0);

        game.flip(0, 1_000).unwrap();
        game.flip(partner, 1_100).unwrap();
        assert_eq!(game.moves(), 1);

        assert!(game.poll(1_599).is_empty());
        assert_eq!(
            game.poll(1_600),
            vec![GameEvent::PairMatched {
                first: 0,
                second: partner
            }]
        );
        assert!(game.cards()[0].matched && game.cards()[partner].matched);
        assert_eq!(game.matched_pairs(), 1);
        assert!(game.flipped_cards().is_empty());
    }

    #[test]
    fn mismatch_is_hidden_after_longer_delay() {
        let mut game = MemoryMatch::with_seed(5);
        let other = mismatch_of(&game, 0);

        game.flip(0, 0).unwrap();
        game.flip(other, 0).unwrap();
        assert!(game.poll(999).is_empty());
        game.poll(1_000);
        assert!(!game.cards()[0].flipped && !game.cards()[other].flipped);
        assert_eq!(game.matched_pairs(), 0);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn third_flip_is_rejected_while_two_are_up() {
        let mut game = MemoryMatch::with_seed(8);
        let other = mismatch_of(&game, 0);
        let third = (0..16).find(|&i| i != 0 && i != other).unwrap();

        game.flip(0, 0).unwrap();
        game.flip(other, 0).unwrap();
        assert!(matches!(game.flip(third, 10), Err(GameError::MoveRejected(_))));
        assert!(!game.cards()[third].flipped);
    }

    #[test]
    fn face_up_and_out_of_range_flips_are_rejected() {
        let mut game = MemoryMatch::with_seed(8);
        game.flip(3, 0).unwrap();
        assert!(matches!(game.flip(3, 0), Err(GameError::MoveRejected(_))));
        assert_eq!(
            game.flip(16, 0),
            Err(GameError::OutOfBounds { index: 16, len: 16 })
        );
        assert_eq!(game.flipped_cards(), &[3]);
    }

    #[test]
    fn matching_every_pair_finishes() {
        let mut game = MemoryMatch::with_seed(21);
        let mut now = 0;
        for index in 0..16 {
            if game.cards()[index].matched {
                continue;
            }
            let partner = partner_of(&game, index);
            game.flip(index, now).unwrap();
            game.flip(partner, now).unwrap();
            now += MATCH_DELAY_MS;
            game.poll(now);
        }
        assert_eq!(game.matched_pairs(), 8);
        assert_eq!(game.moves(), 8);
        assert!(game.is_finished());
        assert_eq!(game.outcome().completed, Some(true));
    }

    #[test]
    fn initialize_cancels_pending_resolution() {
        let mut game = MemoryMatch::with_seed(2);
        let partner = partner_of(&game, 0);
        game.flip(0, 0).unwrap();
        game.flip(partner, 0).unwrap();
        game.initialize();
        assert!(game.poll(10_000).is_empty());
        assert_eq!(game.matched_pairs(), 0);
        assert!(game.cards().iter().all(|c| !c.face_up()));
    }
}
