//! # HealthGames Core Library
//!
//! Core logic of the HealthGames wellness app: a ledger of timed game
//! sessions, nine small therapeutic mini-games and the analytics built on
//! their results. Front-ends (the `healthgames-cli` binary) are thin layers
//! that feed input and the current time into this crate.
//!
//! ## Architecture
//!
//! - **Game machines**: wall-clock based state machines. The caller invokes
//!   `poll(now_ms)` periodically; machines never spawn timers of their own
//! - **Session ledger**: at most one open session, persisted per user
//! - **Storage**: SQLite key-value store and TOML configuration
//! - **Stats**: per-game summaries and dashboard figures
//!
//! ## Key Components
//!
//! - [`SessionLedger`]: session lifecycle and persistence
//! - [`GameMachine`]: common interface of the mini-games
//! - [`GameRun`]: binds a machine to the ledger and reports its outcome once
//! - [`StatsAggregator`]: read-only folds over session lists
//! - [`Database`] / [`Config`]: storage and configuration

pub mod error;
pub mod events;
pub mod games;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, GameError, StorageError};
pub use events::{Event, GameEvent};
pub use games::{catalog, GameId, GameMachine, GameRun, GameStats, GameStatus};
pub use session::{GameSession, Role, SessionLedger, SessionOutcome, SuggestionRelay, User};
pub use stats::{summarize, AdminOverview, GameSummary, Overview, StatsAggregator};
pub use storage::{Config, Database, MemoryStore, SessionStore};
pub use timer::{Clock, ManualClock, SystemClock};
