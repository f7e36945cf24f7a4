use clap::Subcommand;
use healthgames_core::{catalog, Database};
use serde::Serialize;

use super::context::{load_suggestions, print_json, CliResult};

#[derive(Subcommand)]
pub enum GamesAction {
    /// List every game, flagging the suggested ones
    List,
    /// Show one game's details
    Show { game: String },
}

#[derive(Serialize)]
struct PickerEntry<'a> {
    #[serde(flatten)]
    info: &'a healthgames_core::games::GameInfo,
    suggested: bool,
}

pub fn run(action: GamesAction) -> CliResult {
    match action {
        GamesAction::List => {
            let db = Database::open()?;
            let relay = load_suggestions(&db);
            let entries: Vec<PickerEntry<'_>> = catalog()
                .iter()
                .map(|info| PickerEntry {
                    info,
                    suggested: relay.is_highlighted(info.id.as_str()),
                })
                .collect();
            print_json(&entries)?;
        }
        GamesAction::Show { game } => match healthgames_core::games::find_game(&game) {
            Some(info) => print_json(info)?,
            None => return Err(format!("unknown game: {game}").into()),
        },
    }
    Ok(())
}
