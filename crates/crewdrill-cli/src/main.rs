//! crewdrill CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "crewdrill", version, about = "Role-gated training quiz client")]
struct Cli {
    /// Config file path (default: crewdrill.toml, then
    /// ~/.config/crewdrill/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and an example question bank
    Init,

    /// Create a new trainee account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        /// Recovery answer: mother's name
        #[arg(long)]
        mother: String,

        /// Recovery answer: favorite color
        #[arg(long)]
        color: String,
    },

    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Reset a forgotten password via the recovery challenge
    Recover {
        #[arg(long)]
        email: String,

        /// Recovery answer: mother's name (prompted for when omitted)
        #[arg(long)]
        mother: Option<String>,

        /// Recovery answer: favorite color (prompted for when omitted)
        #[arg(long)]
        color: Option<String>,

        /// The replacement password (prompted for when omitted)
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Show the phase board for a track
    Board {
        /// Track to show (defaults to your own role's track)
        #[arg(long)]
        level: Option<String>,
    },

    /// Take a phase quiz interactively
    Quiz {
        #[arg(long)]
        phase: u8,

        /// Track to play (defaults to your own role's track)
        #[arg(long)]
        level: Option<String>,
    },

    /// Show the leaderboard for a track
    Ranking {
        /// Track to rank
        #[arg(long, default_value = "TRAINEE")]
        role: String,

        /// Entries to show, 0 for all (default from config)
        #[arg(long)]
        limit: Option<usize>,

        /// Also write the leaderboard as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show aggregate training stats (administrators)
    Stats {
        /// Also write the summary as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Manage accounts (administrators)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage questions (administrators)
    Questions {
        #[command(subcommand)]
        action: QuestionAction,
    },

    /// Manage global phase activation (administrators)
    Phases {
        #[command(subcommand)]
        action: PhaseAction,
    },

    /// Manage knowledge-base articles (administrators)
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },

    /// Validate question bank TOML files
    ValidateBank {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List every account
    List,
    /// Change an account's role tier
    SetRole {
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },
    /// Reactivate an account
    Activate {
        #[arg(long)]
        email: String,
    },
    /// Deactivate an account (blocks sign-in)
    Deactivate {
        #[arg(long)]
        email: String,
    },
    /// Add a phase-key to an account's unlock list
    Unlock {
        #[arg(long)]
        email: String,
        /// Phase key, e.g. TRAINEE-2
        #[arg(long)]
        key: String,
    },
    /// Remove a phase-key from an account's unlock list
    Revoke {
        #[arg(long)]
        email: String,
        /// Phase key, e.g. TRAINEE-2
        #[arg(long)]
        key: String,
    },
    /// Delete an account's profile
    Delete {
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum QuestionAction {
    /// List questions, optionally filtered
    List {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        phase: Option<u8>,
    },
    /// Import a question bank TOML file or directory
    Import {
        #[arg(long)]
        bank: PathBuf,
    },
    /// Delete a question by id
    Delete {
        #[arg(long)]
        id: uuid::Uuid,
    },
}

#[derive(Subcommand)]
enum PhaseAction {
    /// Show every phase with its activation state and question count
    List,
    /// Flip a phase-key's global activation
    Toggle {
        /// Phase key, e.g. TRAINEE-2
        #[arg(long)]
        key: String,
    },
}

#[derive(Subcommand)]
enum KnowledgeAction {
    /// List articles, optionally for one track
    List {
        #[arg(long)]
        level: Option<String>,
    },
    /// Add an article
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        level: String,
    },
    /// Delete an article by id
    Delete {
        #[arg(long)]
        id: uuid::Uuid,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crewdrill=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Register {
            name,
            email,
            password,
            mother,
            color,
        } => commands::auth::register(config, name, email, password, mother, color).await,
        Commands::Login { email, password } => {
            commands::auth::login(config, email, password).await
        }
        Commands::Logout => commands::auth::logout(config).await,
        Commands::Whoami => commands::auth::whoami(config).await,
        Commands::Recover {
            email,
            mother,
            color,
            new_password,
        } => commands::auth::recover(config, email, mother, color, new_password).await,
        Commands::Board { level } => commands::quiz::board(config, level).await,
        Commands::Quiz { phase, level } => commands::quiz::take(config, level, phase).await,
        Commands::Ranking { role, limit, json } => {
            commands::ranking::execute(config, role, limit, json).await
        }
        Commands::Stats { json } => commands::stats::execute(config, json).await,
        Commands::Users { action } => commands::users::execute(config, action).await,
        Commands::Questions { action } => commands::questions::execute(config, action).await,
        Commands::Phases { action } => commands::phases::execute(config, action).await,
        Commands::Knowledge { action } => commands::knowledge::execute(config, action).await,
        Commands::ValidateBank { bank } => commands::questions::validate(bank),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
