//! Read-only analytics over session lists.
//!
//! - [`StatsAggregator`] folds a session list into per-game summaries with a
//!   configurable "best score" rule per game.
//! - [`overview`] and [`recent`] back the personal dashboard.
//! - [`AdminOverview`] folds every stored user's list.
//!
//! Nothing here writes to the ledger.

mod overview;
mod summary;

pub use overview::{overview, recent, AdminGameUsage, AdminOverview, GameUsage, Overview};
pub use summary::{summarize, GameSummary, ScoreDirection, ScoreRule, StatsAggregator};
