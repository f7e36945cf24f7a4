use clap::Subcommand;
use healthgames_core::{Role, User};

use super::context::{open_ledger, print_json, report, save_user, CliResult};

#[derive(Subcommand)]
pub enum UserAction {
    /// Sign in, closing any session left open by the previous user
    Login {
        /// User id; sessions are stored under it
        id: String,
        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Sign out
    Logout,
    /// Print the signed-in user as JSON
    Show,
}

pub fn run(action: UserAction) -> CliResult {
    let (mut ledger, _) = open_ledger()?;
    match action {
        UserAction::Login { id, name, admin } => {
            let role = if admin { Role::Admin } else { Role::User };
            let name = name.unwrap_or_else(|| id.clone());
            let user = User::new(id, name, role);
            save_user(ledger.store(), Some(&user))?;
            report(&ledger.switch_user(Some(user.clone())));
            print_json(&user)?;
        }
        UserAction::Logout => {
            report(&ledger.switch_user(None));
            save_user(ledger.store(), None)?;
            println!("signed out");
        }
        UserAction::Show => print_json(&ledger.user())?,
    }
    Ok(())
}
