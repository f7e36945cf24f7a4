//! Word scramble: unscramble as many words as possible in 30 seconds.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::{GameId, GameMachine, GameStats, GameStatus, WordScrambleStats, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Interval;

pub const START_SECS: u32 = 30;
const SHUFFLE_ATTEMPTS: usize = 8;

pub const WORDS: [&str; 20] = [
    "health", "wellness", "exercise", "mindful", "breathe", "fitness", "therapy", "balance",
    "strength", "healing", "tranquil", "peaceful", "harmony", "vitality", "relax", "recovery",
    "calming", "soothing", "energize", "refresh",
];

/// Permute the letters of `word`.
///
/// The result differs from `word` whenever the word has at least two
/// distinct letters.
pub fn scramble<R: Rng>(word: &str, rng: &mut R) -> String {
    let original: Vec<char> = word.chars().collect();
    let mut letters = original.clone();
    for _ in 0..SHUFFLE_ATTEMPTS {
        letters.shuffle(rng);
        if letters != original {
            return letters.into_iter().collect();
        }
    }
    // Rotating the original moves at least one letter onto a different one
    // unless every letter is the same.
    let mut rotated = original;
    if !rotated.is_empty() {
        rotated.rotate_left(1);
    }
    rotated.into_iter().collect()
}

#[derive(Debug, Clone)]
pub struct WordScramble {
    status: GameStatus,
    words: Vec<String>,
    word: String,
    scrambled: String,
    score: u32,
    rounds: u32,
    time_left: u32,
    ticker: Interval,
    rng: Pcg64Mcg,
}

impl Default for WordScramble {
    fn default() -> Self {
        Self::new()
    }
}

impl WordScramble {
    pub fn new() -> Self {
        Self::build(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::build(Pcg64Mcg::seed_from_u64(seed))
    }

    fn build(rng: Pcg64Mcg) -> Self {
        Self {
            status: GameStatus::Idle,
            words: WORDS.iter().map(|w| w.to_string()).collect(),
            word: String::new(),
            scrambled: String::new(),
            score: 0,
            rounds: 0,
            time_left: START_SECS,
            ticker: Interval::new(TICK_MS),
            rng,
        }
    }

    /// Replace the word list. An empty list keeps the built-in one.
    pub fn with_words(mut self, words: Vec<String>) -> Self {
        if !words.is_empty() {
            self.words = words;
        }
        self
    }

    pub fn scrambled(&self) -> &str {
        &self.scrambled
    }

    /// The word to guess.
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.rounds = 0;
        self.time_left = START_SECS;
        self.select_word();
        self.ticker.start(now_ms);
        vec![GameEvent::Started]
    }

    pub fn guess(&mut self, guess: &str) -> Result<Vec<GameEvent>, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let guess = guess.trim();
        if guess.is_empty() {
            return Err(GameError::InvalidInput("empty guess".into()));
        }
        if !guess.eq_ignore_ascii_case(&self.word) {
            return Ok(vec![GameEvent::Incorrect { expected: None }]);
        }

        self.score += 1;
        self.rounds += 1;
        self.select_word();
        Ok(vec![
            GameEvent::Correct { points: 1 },
            GameEvent::NewRound { round: self.rounds + 1 },
        ])
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

    fn select_word(&mut self) {
        let word = self
            .words
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        self.scrambled = scramble(&word, &mut self.rng);
        self.word = word;
    }
}

impl GameMachine for WordScramble {
    fn game_id(&self) -> GameId {
        GameId::WordScramble
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
        WordScrambleStats {
            score: self.score,
            rounds: self.rounds,
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

    fn sorted(word: &str) -> Vec<char> {
        let mut chars: Vec<char> = word.chars().collect();
        chars.sort_unstable();
        chars
    }

    #[test]
    fn scramble_is_a_different_permutation() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        for word in WORDS.iter().chain(["ab", "aab", "no"].iter()) {
            for _ in 0..20 {
                let scrambled = scramble(word, &mut rng);
                assert_ne!(scrambled.as_str(), *word);
                assert_eq!(sorted(&scrambled), sorted(word));
            }
        }
    }

    #[test]
    fn single_letter_words_are_left_alone() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        assert_eq!(scramble("aaa", &mut rng), "aaa");
        assert_eq!(scramble("", &mut rng), "");
    }

    #[test]
    fn correct_guess_scores_and_advances() {
        let mut game = WordScramble::with_seed(3);
        game.start(0);
        let word = game.word().to_uppercase();
        let events = game.guess(&format!(" {word} ")).unwrap();
        assert_eq!(events[0], GameEvent::Correct { points: 1 });
        assert_eq!((game.score(), game.rounds()), (1, 1));
        assert_eq!(sorted(game.scrambled()), sorted(game.word()));
    }

    #[test]
    fn wrong_guess_keeps_the_word() {
        let mut game = WordScramble::with_seed(4);
        game.start(0);
        let word = game.word().to_string();
        assert_eq!(
            game.guess("nope").unwrap(),
            vec![GameEvent::Incorrect { expected: None }]
        );
        assert_eq!(game.word(), word);
        assert_eq!(game.score(), 0);
        assert!(matches!(game.guess("   "), Err(GameError::InvalidInput(_))));
    }

    #[test]
    fn shared_countdown_ends_the_game() {
        let mut game = WordScramble::with_seed(5);
        game.start(0);
        game.poll(10_000);
        let word = game.word().to_string();
        game.guess(&word).unwrap();
        assert_eq!(game.time_left(), 20);
        assert!(game.poll(30_000).contains(&GameEvent::Finished));
        assert_eq!(game.guess("health"), Err(GameError::NotPlaying));
    }

    #[test]
    fn custom_word_list_is_used() {
        let mut game = WordScramble::with_seed(6).with_words(vec!["calm".into()]);
        game.start(0);
        assert_eq!(game.word(), "calm");
        assert_ne!(game.scrambled(), "calm");
    }
}
