use clap::Subcommand;
use healthgames_core::session::stored_sessions;
use healthgames_core::stats::{overview, recent, summarize, AdminOverview};
use healthgames_core::timer::now_ms;

use super::context::{open_ledger, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Per-game summaries with best scores
    Summary,
    /// Personal dashboard figures
    Overview,
    /// Most recent sessions, newest first
    Recent {
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
    /// Figures across every stored user (admin only)
    Admin,
}

pub fn run(action: StatsAction) -> CliResult {
    let (ledger, _) = open_ledger()?;

    match action {
        StatsAction::Summary => print_json(&summarize(ledger.sessions()))?,
        StatsAction::Overview => print_json(&overview(ledger.sessions(), now_ms()))?,
        StatsAction::Recent { count } => print_json(&recent(ledger.sessions(), count))?,
        StatsAction::Admin => {
            if !ledger.user().is_some_and(|u| u.is_admin()) {
                return Err("admin role required".into());
            }
            let users = stored_sessions(ledger.store(), ledger.key_prefix());
            print_json(&AdminOverview::build(&users, now_ms()))?;
        }
    }
    Ok(())
}
