//! Interactive play in the terminal.
//!
//! Game events are printed to stdout as JSON lines; ledger events and
//! notices go to stderr. Type `show` for the board, `quit` to leave.

use std::time::Duration;

use clap::Args;
use healthgames_core::error::GameError;
use healthgames_core::games::color_relaxation::SESSION_LENGTHS;
use healthgames_core::games::music::NOTES;
use healthgames_core::games::{
    BreathingPacer, ColorRelaxation, FocusCounter, GameMachine, GameRun, MemoryMatch, MentalMath,
    MusicMode, MusicalMemory, PatternMatch, ReactionTimer, WordScramble,
};
use healthgames_core::storage::GamesConfig;
use healthgames_core::timer::now_ms;
use healthgames_core::{Database, GameEvent, GameId, SessionLedger};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::context::{open_ledger, print_json, report, CliResult};

/// How often machine timers are polled.
const POLL_MS: u64 = 100;

#[derive(Args)]
pub struct PlayArgs {
    /// Game id (e.g. "memory", "math-challenge")
    pub game: GameId,
    /// Seed for a reproducible board
    #[arg(long)]
    pub seed: Option<u64>,
    /// Music therapy mode: free, memory or repeat
    #[arg(long, default_value = "memory")]
    pub mode: MusicMode,
    /// Color relaxation session length in seconds (60, 180 or 300)
    #[arg(long)]
    pub secs: Option<u32>,
}

/// A machine the terminal can drive line by line.
trait Playable: GameMachine {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError>;

    fn input(&mut self, line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError>;

    fn view(&self) -> Value;
}

fn parse_index(line: &str) -> Result<usize, GameError> {
    line.parse()
        .map_err(|_| GameError::InvalidInput(format!("expected a number, got '{line}'")))
}

impl Playable for MemoryMatch {
    fn begin(&mut self, _now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(vec![GameEvent::Started])
    }

    fn input(&mut self, line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.flip(parse_index(line)?, now_ms)
    }

    fn view(&self) -> Value {
        let board: Vec<String> = self
            .cards()
            .iter()
            .map(|c| if c.face_up() { c.value.to_string() } else { "?".into() })
            .collect();
        json!({
            "board": board,
            "moves": self.moves(),
            "matchedPairs": self.matched_pairs(),
            "totalPairs": self.total_pairs(),
        })
    }
}

impl Playable for BreathingPacer {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms).into_iter().collect())
    }

    fn input(&mut self, line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        let event = match line {
            "pause" => self.pause(),
            "resume" | "start" => self.start(now_ms),
            "reset" => Some(self.reset()),
            other => {
                return Err(GameError::InvalidInput(format!(
                    "expected pause, resume or reset, got '{other}'"
                )))
            }
        };
        Ok(event.into_iter().collect())
    }

    fn view(&self) -> Value {
        json!({
            "phase": self.phase(),
            "message": self.phase().message(),
            "secondsLeft": self.seconds_left(),
            "cyclesCompleted": self.cycles_completed(),
            "targetCycles": self.target_cycles(),
        })
    }
}

impl Playable for ReactionTimer {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms))
    }

    fn input(&mut self, _line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.click(now_ms)
    }

    fn view(&self) -> Value {
        json!({
            "phase": format!("{:?}", self.phase()),
            "attempts": self.attempts(),
            "bestTime": self.best_time(),
        })
    }
}

impl Playable for WordScramble {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms))
    }

    fn input(&mut self, line: &str, _now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.guess(line)
    }

    fn view(&self) -> Value {
        json!({
            "scrambled": self.scrambled(),
            "score": self.score(),
            "timeLeft": self.time_left(),
        })
    }
}

struct TimedColorRelaxation {
    machine: ColorRelaxation,
    secs: u32,
}

impl GameMachine for TimedColorRelaxation {
    fn game_id(&self) -> GameId {
        self.machine.game_id()
    }

    fn status(&self) -> healthgames_core::GameStatus {
        self.machine.status()
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.machine.poll(now_ms)
    }

    fn stats(&self) -> healthgames_core::GameStats {
        self.machine.stats()
    }

    fn stop_timers(&mut self) {
        self.machine.stop_timers();
    }
}

impl Playable for TimedColorRelaxation {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.machine.start(self.secs, now_ms)
    }

    fn input(&mut self, _line: &str, _now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Err(GameError::InvalidInput("just breathe; type quit to leave".into()))
    }

    fn view(&self) -> Value {
        json!({
            "phase": self.machine.phase(),
            "prompt": self.machine.prompt(),
            "color": self.machine.color(),
            "timeRemaining": self.machine.time_remaining(),
            "totalBreaths": self.machine.total_breaths(),
        })
    }
}

impl Playable for PatternMatch {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms))
    }

    fn input(&mut self, line: &str, _now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.select(parse_index(line)?)
    }

    fn view(&self) -> Value {
        json!({
            "target": self.target(),
            "options": self.options(),
            "level": self.level(),
            "score": self.score(),
            "timeLeft": self.time_left(),
        })
    }
}

impl Playable for FocusCounter {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms))
    }

    fn input(&mut self, line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        match line {
            "+" => self.increment().map(|_| Vec::new()),
            "-" => self.decrement().map(|_| Vec::new()),
            "submit" | "s" => self.submit(now_ms),
            count => {
                let count = count.parse().map_err(|_| {
                    GameError::InvalidInput(format!("expected +, -, submit or a count, got '{count}'"))
                })?;
                self.set_count(count).map(|_| Vec::new())
            }
        }
    }

    fn view(&self) -> Value {
        json!({
            "target": self.target(),
            "shapes": self.shapes(),
            "count": self.user_count(),
            "lives": self.lives(),
            "level": self.level(),
            "score": self.score(),
            "timeLeft": self.time_left(),
        })
    }
}

impl Playable for MentalMath {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.start(now_ms))
    }

    fn input(&mut self, line: &str, _now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        self.answer(line)
    }

    fn view(&self) -> Value {
        json!({
            "problem": self.problem().to_string(),
            "level": self.level(),
            "score": self.score(),
            "timeLeft": self.time_left(),
        })
    }
}

struct ModalMusic {
    machine: MusicalMemory,
    mode: MusicMode,
}

impl GameMachine for ModalMusic {
    fn game_id(&self) -> GameId {
        self.machine.game_id()
    }

    fn status(&self) -> healthgames_core::GameStatus {
        self.machine.status()
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        self.machine.poll(now_ms)
    }

    fn stats(&self) -> healthgames_core::GameStats {
        self.machine.stats()
    }

    fn stop_timers(&mut self) {
        self.machine.stop_timers();
    }
}

impl Playable for ModalMusic {
    fn begin(&mut self, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        Ok(self.machine.start(self.mode, now_ms))
    }

    fn input(&mut self, line: &str, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        if line == "replay" {
            return self.machine.replay(now_ms).map(|()| Vec::new());
        }
        let note = NOTES
            .iter()
            .position(|n| n.name.eq_ignore_ascii_case(line))
            .map_or_else(|| parse_index(line), Ok)?;
        self.machine.press(note, now_ms)
    }

    fn view(&self) -> Value {
        let notes: Vec<&str> = NOTES.iter().map(|n| n.name).collect();
        json!({
            "mode": self.machine.mode(),
            "level": self.machine.level(),
            "sequenceLength": self.machine.sequence().len(),
            "entered": self.machine.player_sequence().len(),
            "playingBack": self.machine.is_playing_back(),
            "notes": notes,
        })
    }
}

fn emit(events: &[GameEvent]) {
    for event in events {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }
}

/// Drive one run until it finishes, the player quits or ctrl-c tears it down.
///
/// The session is closed on every exit path, including IO failures.
async fn drive<M: Playable>(ledger: &mut SessionLedger<Database>, machine: M) -> CliResult {
    let (mut run, events) = GameRun::begin(ledger, machine);
    report(&events);
    if let Err(e) = play_loop(&mut run, ledger).await {
        report(&run.exit(ledger));
        return Err(e);
    }
    print_json(&run.machine().stats())
}

async fn play_loop<M: Playable>(
    run: &mut GameRun<M>,
    ledger: &mut SessionLedger<Database>,
) -> CliResult {
    emit(&run.machine_mut().begin(now_ms())?);
    print_json(&run.machine().view())?;

    let mut ticker = tokio::time::interval(Duration::from_millis(POLL_MS));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (game_events, ledger_events) = run.poll(ledger, now_ms());
                emit(&game_events);
                report(&ledger_events);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed, leaving game");
                    report(&run.exit(ledger));
                    break;
                };
                match line.trim() {
                    "" => {}
                    "quit" | "exit" => {
                        report(&run.exit(ledger));
                        break;
                    }
                    "show" => print_json(&run.machine().view())?,
                    input => match run.machine_mut().input(input, now_ms()) {
                        Ok(events) => {
                            emit(&events);
                            report(&run.settle(ledger));
                        }
                        Err(e) => eprintln!("notice: {e}"),
                    },
                }
            }
            _ = tokio::signal::ctrl_c() => {
                run.machine_mut().stop_timers();
                report(&ledger.flush_on_teardown());
                break;
            }
        }

        if run.is_reported() {
            break;
        }
    }
    Ok(())
}

pub fn run(args: PlayArgs) -> CliResult {
    let (mut ledger, config) = open_ledger()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play(&mut ledger, &config.games, args))
}

async fn play(
    ledger: &mut SessionLedger<Database>,
    games: &GamesConfig,
    args: PlayArgs,
) -> CliResult {
    let seed = args.seed;
    match args.game {
        GameId::Memory => {
            let machine = seed.map_or_else(MemoryMatch::new, MemoryMatch::with_seed);
            let machine =
                machine.with_delays(games.memory_match_delay_ms, games.memory_mismatch_delay_ms);
            drive(ledger, machine).await
        }
        GameId::Breathing => {
            drive(ledger, BreathingPacer::with_target_cycles(games.breathing_cycles)).await
        }
        GameId::Reaction => {
            let machine = seed.map_or_else(ReactionTimer::new, ReactionTimer::with_seed);
            let attempts = usize::try_from(games.reaction_attempts).unwrap_or(usize::MAX);
            drive(ledger, machine.with_max_attempts(attempts)).await
        }
        GameId::WordScramble => {
            let machine = seed.map_or_else(WordScramble::new, WordScramble::with_seed);
            drive(ledger, machine).await
        }
        GameId::ColorRelaxation => {
            let secs = args.secs.unwrap_or(games.color_session_secs);
            if !SESSION_LENGTHS.contains(&secs) {
                return Err(format!("session length must be one of {SESSION_LENGTHS:?}").into());
            }
            let machine = TimedColorRelaxation {
                machine: seed.map_or_else(ColorRelaxation::new, ColorRelaxation::with_seed),
                secs,
            };
            drive(ledger, machine).await
        }
        GameId::PatternMatch => {
            let machine = seed.map_or_else(PatternMatch::new, PatternMatch::with_seed);
            drive(ledger, machine).await
        }
        GameId::FocusCounter => {
            let machine = seed.map_or_else(FocusCounter::new, FocusCounter::with_seed);
            drive(ledger, machine.with_lives(games.focus_lives)).await
        }
        GameId::MathChallenge => {
            let machine = seed.map_or_else(MentalMath::new, MentalMath::with_seed);
            drive(ledger, machine).await
        }
        GameId::MusicTherapy => {
            let machine = ModalMusic {
                machine: seed.map_or_else(MusicalMemory::new, MusicalMemory::with_seed),
                mode: args.mode,
            };
            drive(ledger, machine).await
        }
    }
}
