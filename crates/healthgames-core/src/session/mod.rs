//! Session lifecycle: the ledger of played games, the active identity and
//! the assistant's current suggestions.

mod identity;
mod ledger;
mod record;
mod suggestions;

pub use identity::{Role, User};
pub use ledger::{parse_sessions, stored_sessions, SessionLedger};
pub use record::{GameSession, SessionOutcome};
pub use suggestions::SuggestionRelay;
