//! Color relaxation: breathe with a slowly shifting color field.
//!
//! Two intervals run together. The session clock ticks every second and the
//! breath clock every four seconds (inhale -> hold -> exhale). Each
//! completed exhale counts a breath and picks a new color.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::{ColorRelaxationStats, GameId, GameMachine, GameStats, GameStatus, TICK_MS};
use crate::error::GameError;
use crate::events::GameEvent;
use crate::timer::Interval;

pub const BREATH_PHASE_MS: u64 = 4_000;
pub const SESSION_LENGTHS: [u32; 3] = [60, 180, 300];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub hex: &'static str,
    pub name: &'static str,
    pub emotion: &'static str,
}

pub const PALETTE: [Swatch; 6] = [
    Swatch {
        hex: "#7DD3FC",
        name: "light blue",
        emotion: "calm",
    },
    Swatch {
        hex: "#A7F3D0",
        name: "mint green",
        emotion: "refreshed",
    },
    Swatch {
        hex: "#C4B5FD",
        name: "lavender",
        emotion: "peaceful",
    },
    Swatch {
        hex: "#FDE68A",
        name: "soft yellow",
        emotion: "joyful",
    },
    Swatch {
        hex: "#FDBA74",
        name: "peach",
        emotion: "warm",
    },
    Swatch {
        hex: "#F9A8D4",
        name: "pink",
        emotion: "loving",
    },
];

pub const PROMPTS: [&str; 6] = [
    "Notice how this color makes you feel",
    "Breathe deeply as the color surrounds you",
    "Let the color wash away your tension",
    "Imagine the color healing your body",
    "Feel the energy of this color",
    "Allow yourself to melt into this color",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBreath {
    Inhale,
    Hold,
    Exhale,
}

impl ColorBreath {
    pub fn prompt(&self) -> &'static str {
        match self {
            ColorBreath::Inhale => "Breathe in slowly...",
            ColorBreath::Hold => "Hold your breath gently...",
            ColorBreath::Exhale => "Breathe out slowly...",
        }
    }

    fn next(&self) -> ColorBreath {
        match self {
            ColorBreath::Inhale => ColorBreath::Hold,
            ColorBreath::Hold => ColorBreath::Exhale,
            ColorBreath::Exhale => ColorBreath::Inhale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorRelaxation {
    status: GameStatus,
    session_secs: u32,
    time_remaining: u32,
    phase: ColorBreath,
    prompt: &'static str,
    color: Swatch,
    color_changes: u32,
    total_breaths: u32,
    clock: Interval,
    breath: Interval,
    rng: Pcg64Mcg,
}

impl Default for ColorRelaxation {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRelaxation {
    pub fn new() -> Self {
        Self::with_rng(Pcg64Mcg::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg64Mcg) -> Self {
        Self {
            status: GameStatus::Idle,
            session_secs: SESSION_LENGTHS[0],
            time_remaining: SESSION_LENGTHS[0],
            phase: ColorBreath::Inhale,
            prompt: ColorBreath::Inhale.prompt(),
            color: PALETTE[0],
            color_changes: 0,
            total_breaths: 0,
            clock: Interval::new(TICK_MS),
            breath: Interval::new(BREATH_PHASE_MS),
            rng,
        }
    }

    pub fn phase(&self) -> ColorBreath {
        self.phase
    }

    pub fn prompt(&self) -> &str {
        self.prompt
    }

    pub fn color(&self) -> Swatch {
        self.color
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn session_secs(&self) -> u32 {
        self.session_secs
    }

    pub fn total_breaths(&self) -> u32 {
        self.total_breaths
    }

    /// Seconds actually spent in the session so far.
    pub fn elapsed_secs(&self) -> u32 {
        self.session_secs - self.time_remaining
    }

    pub fn start(&mut self, session_secs: u32, now_ms: u64) -> Result<Vec<GameEvent>, GameError> {
        if !SESSION_LENGTHS.contains(&session_secs) {
            return Err(GameError::InvalidInput(format!(
                "session length must be one of {SESSION_LENGTHS:?} seconds"
            )));
        }
        self.status = GameStatus::Playing;
        self.session_secs = session_secs;
        self.time_remaining = session_secs;
        self.phase = ColorBreath::Inhale;
        self.prompt = self.phase.prompt();
        self.color_changes = 0;
        self.total_breaths = 0;
        self.clock.start(now_ms);
        self.breath.start(now_ms);

        let mut events = vec![GameEvent::Started];
        events.push(self.change_color(false));
        Ok(events)
    }

    /// One second of the session clock.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return Vec::new();
        }
        self.status = GameStatus::Finished;
        self.stop_timers();
        vec![GameEvent::TimeUp, GameEvent::Finished]
    }

    /// One four-second step of the breath clock.
    pub fn breath_tick(&mut self) -> Vec<GameEvent> {
        if self.status != GameStatus::Playing {
            return Vec::new();
        }
        let mut events = Vec::new();
        let completed_exhale = self.phase == ColorBreath::Exhale;
        self.phase = self.phase.next();
        self.prompt = self.phase.prompt();
        if completed_exhale {
            self.total_breaths += 1;
            events.push(self.change_color(true));
            if self.rng.gen_bool(0.5) {
                self.prompt = PROMPTS.choose(&mut self.rng).copied().unwrap_or(self.prompt);
            }
        }
        events.push(GameEvent::ColorBreathChanged {
            phase: self.phase,
            prompt: self.prompt.to_string(),
        });
        events
    }

    fn change_color(&mut self, counted: bool) -> GameEvent {
        self.color = *PALETTE.choose(&mut self.rng).unwrap_or(&PALETTE[0]);
        if counted {
            self.color_changes += 1;
        }
        GameEvent::ColorChanged {
            color: self.color.hex.to_string(),
            name: self.color.name.to_string(),
        }
    }
}

impl GameMachine for ColorRelaxation {
    fn game_id(&self) -> GameId {
        GameId::ColorRelaxation
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn poll(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        // Fire both intervals in timestamp order; the session clock wins ties.
        while self.status == GameStatus::Playing {
            let clock_due = self.clock.next_due().filter(|due| *due <= now_ms);
            let breath_due = self.breath.next_due().filter(|due| *due <= now_ms);
            match (clock_due, breath_due) {
                (Some(c), Some(b)) if b < c => {
                    self.breath.due(now_ms);
                    events.extend(self.breath_tick());
                }
                (Some(_), _) => {
                    self.clock.due(now_ms);
                    events.extend(self.tick());
                }
                (None, Some(_)) => {
                    self.breath.due(now_ms);
                    events.extend(self.breath_tick());
                }
                (None, None) => break,
            }
        }
        events
    }

    fn stats(&self) -> GameStats {
        ColorRelaxationStats {
            duration: self.elapsed_secs(),
            color_changes: self.color_changes,
            total_breaths: self.total_breaths,
        }
        .into()
    }

    fn stop_timers(&mut self) {
        self.clock.stop();
        self.breath.stop();
    }
}
