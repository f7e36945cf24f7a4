use clap::Subcommand;
use healthgames_core::{GameId, GameStats, SessionOutcome};

use super::context::{open_ledger, print_json, report, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Open a session, force-closing any session still open
    Start {
        /// Game id (e.g. "memory", "word-scramble")
        game: GameId,
    },
    /// Close the open session of GAME
    End {
        game: GameId,
        /// Record the session as abandoned
        #[arg(long)]
        abandoned: bool,
        /// Stats payload as JSON, e.g. '{"kind":"memory","moves":9,"matchedPairs":8}'
        #[arg(long)]
        stats: Option<String>,
    },
    /// Close whatever is open as closed by teardown
    Flush,
    /// Print the open session as JSON
    Current,
    /// Print every closed session as JSON
    List,
}

pub fn run(action: SessionAction) -> CliResult {
    let (mut ledger, _) = open_ledger()?;
    match action {
        SessionAction::Start { game } => {
            let events = ledger.start(game);
            report(&events);
            print_json(&ledger.current())?;
        }
        SessionAction::End {
            game,
            abandoned,
            stats,
        } => {
            let stats = stats
                .map(|raw| serde_json::from_str::<GameStats>(&raw))
                .transpose()?;
            if stats.as_ref().is_some_and(|s| s.game_id() != game) {
                return Err(format!("stats payload does not belong to {game}").into());
            }
            let outcome = SessionOutcome {
                completed: Some(!abandoned),
                closed_tab: false,
                stats,
            };
            let events = ledger.end(game, outcome);
            if events.is_empty() {
                return Err(format!("no open {game} session").into());
            }
            report(&events);
            print_json(&ledger.sessions().last())?;
        }
        SessionAction::Flush => {
            let events = ledger.flush_on_teardown();
            report(&events);
            print_json(&events)?;
        }
        SessionAction::Current => print_json(&ledger.current())?,
        SessionAction::List => print_json(ledger.sessions())?,
    }
    Ok(())
}
