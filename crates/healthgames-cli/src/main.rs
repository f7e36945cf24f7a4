use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "healthgames-cli", version, about = "HealthGames CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play(commands::play::PlayArgs),
    /// Session ledger control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Session statistics and dashboards
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Game suggestions from the assistant
    Suggest {
        #[command(subcommand)]
        action: commands::suggest::SuggestAction,
    },
    /// Game catalog
    Games {
        #[command(subcommand)]
        action: commands::games::GamesAction,
    },
    /// Identity management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HEALTHGAMES_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Session { action } => commands::session::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Suggest { action } => commands::suggest::run(action),
        Commands::Games { action } => commands::games::run(action),
        Commands::User { action } => commands::user::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
