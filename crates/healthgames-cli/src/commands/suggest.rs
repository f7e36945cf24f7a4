use clap::Subcommand;
use healthgames_core::Database;

use super::context::{load_suggestions, print_json, report, save_suggestions, CliResult};

#[derive(Subcommand)]
pub enum SuggestAction {
    /// Replace the suggested games, in order
    Set {
        /// Game ids as delivered by the assistant
        games: Vec<String>,
    },
    /// Print the current suggestions and the games they highlight
    Show,
    /// Drop all suggestions
    Clear,
}

pub fn run(action: SuggestAction) -> CliResult {
    let db = Database::open()?;
    let mut relay = load_suggestions(&db);

    match action {
        SuggestAction::Set { games } => {
            let event = relay.suggest(games);
            save_suggestions(&db, &relay)?;
            report(&[event]);
            print_json(relay.current())?;
        }
        SuggestAction::Show => {
            let highlighted: Vec<_> = relay.highlighted().iter().map(|g| g.id).collect();
            print_json(&serde_json::json!({
                "suggested": relay.current(),
                "highlighted": highlighted,
            }))?;
        }
        SuggestAction::Clear => {
            relay.clear();
            save_suggestions(&db, &relay)?;
            println!("suggestions cleared");
        }
    }
    Ok(())
}
