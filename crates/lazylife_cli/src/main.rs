//! `lazylife` command-line front end.
//!
//! # Responsibility
//! - Resolve config, owner identity and database, then dispatch one command.
//! - Print command outcomes (notifications) to stderr, data to stdout.
//!
//! # Invariants
//! - A failed command exits non-zero.
//! - `--owner`/`LAZYLIFE_OWNER` overrides the config file's `owner_id`.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AssignmentCommand, CliError, HabitCommand, ItemCommand, NoteCommand, ProfileCommand,
};
use lazylife_core::{
    init_logging, open_db, open_db_in_memory, AppConfig, IdentityProvider, OwnerId,
    StaticIdentity,
};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lazylife")]
#[command(about = "Habits, assignments, checklists and notes from the terminal", version)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, env = "LAZYLIFE_CONFIG", default_value = "lazylife.json")]
    config: PathBuf,

    /// SQLite database path (overrides config file)
    #[arg(long, env = "LAZYLIFE_DB")]
    db: Option<PathBuf>,

    /// Signed-in owner id (overrides config file)
    #[arg(long, env = "LAZYLIFE_OWNER")]
    owner: Option<String>,

    /// Use a throwaway in-memory database
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check core linkage
    Ping,

    /// Daily habit tracker
    #[command(subcommand)]
    Habit(HabitCommand),

    /// Assignment tracker
    #[command(subcommand)]
    Assignment(AssignmentCommand),

    /// Daily checklist items
    #[command(subcommand)]
    Item(ItemCommand),

    /// Markdown notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// User profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Run a pomodoro countdown in the foreground
    Timer {
        /// Countdown length in minutes
        #[arg(short, long, default_value_t = lazylife_core::timer::DEFAULT_COUNTDOWN_MINUTES)]
        minutes: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(&cli.config)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let identity = resolve_identity(cli.owner.as_deref(), &config)?;
    let owner = identity.current_owner();

    let command = match cli.command {
        Command::Ping => {
            println!("lazylife_core ping={}", lazylife_core::ping());
            println!("lazylife_core version={}", lazylife_core::core_version());
            return Ok(());
        }
        Command::Timer { minutes } => return commands::run_timer(minutes),
        command => command,
    };

    let conn = if cli.ephemeral {
        open_db_in_memory()?
    } else {
        open_db(cli.db.as_ref().unwrap_or(&config.db_path))?
    };
    info!(
        "event=cli_start module=cli status=ok signed_in={}",
        owner.is_some()
    );

    let owner = owner.as_ref();
    match command {
        Command::Habit(command) => commands::run_habit(&conn, owner, command),
        Command::Assignment(command) => commands::run_assignment(&conn, owner, command),
        Command::Item(command) => commands::run_item(&conn, owner, command),
        Command::Note(command) => commands::run_note(&conn, owner, command),
        Command::Profile(command) => commands::run_profile(&conn, owner, command),
        Command::Ping | Command::Timer { .. } => Ok(()),
    }
}

fn resolve_identity(flag: Option<&str>, config: &AppConfig) -> Result<StaticIdentity, CliError> {
    match flag {
        Some(raw) => Ok(StaticIdentity::new(OwnerId::parse(raw)?)),
        None => Ok(config
            .owner()
            .map(StaticIdentity::new)
            .unwrap_or_else(StaticIdentity::signed_out)),
    }
}
