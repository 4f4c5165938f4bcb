//! Subcommand definitions and handlers.

use chrono::Datelike;
use clap::{ArgAction, Subcommand};
use lazylife_core::db::Connection;
use lazylife_core::model::date_key::{date_from_epoch_ms, epoch_ms_at_midnight};
use lazylife_core::service::checklist_service::completion_summary;
use lazylife_core::service::habit_service::completed_days_in_month;
use lazylife_core::{
    AssignmentPatch, AssignmentService, BindingError, ChecklistService, ConfigError, Countdown,
    DateKey, DbError, HabitService, LoggingError, NoteService, Notification, NotificationLevel,
    Notifier, OwnerId, ProfileBinding, ProgressFlag, Record, RecordError, RecordId,
    SqliteDocumentStore, SqliteObjectStore, StoreError, UserProfile,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TIMER_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Subcommand)]
pub enum HabitCommand {
    /// List habits with their completed days
    List {
        /// Month to show, as YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Add a habit
    Add { text: String },
    /// Mark or unmark a day
    Toggle {
        id: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a habit
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AssignmentCommand {
    /// List assignments by due date
    List,
    /// Add an assignment
    Add {
        topic: String,
        /// Due day as YYYY-MM-DD
        due: String,
    },
    /// Set one progress flag (started, in-progress, handed-in)
    Set {
        id: String,
        flag: String,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
    /// Delete an assignment
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// List checklist items
    List,
    /// Add a checklist item
    Add { text: String },
    /// Flip an item's completion
    Toggle { id: String },
    /// Delete a checklist item
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// List notes with previews
    List,
    /// Print one note
    Show { id: String },
    /// Add a note
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        content: String,
    },
    /// Replace a note's title and, optionally, its content
    Edit {
        id: String,
        title: String,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Flip the task-list checkbox on a zero-based line
    Check { id: String, line: usize },
    /// Delete a note
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the profile
    Show,
    /// Update profile fields; omitted fields are kept
    Set {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Upload a profile picture
    UploadImage {
        path: PathBuf,
        /// MIME type (inferred from the file extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
}

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Store(StoreError),
    Binding(BindingError),
    Record(RecordError),
    SignedOut,
    NotFound { label: &'static str, id: String },
    Usage(String),
    Io { path: PathBuf, source: std::io::Error },
    Terminal(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Binding(err) => write!(f, "{err}"),
            Self::Record(err) => write!(f, "{err}"),
            Self::SignedOut => write!(
                f,
                "not signed in; pass --owner or set owner_id in the config file"
            ),
            Self::NotFound { label, id } => write!(f, "no {label} with id `{id}`"),
            Self::Usage(message) => write!(f, "{message}"),
            Self::Io { path, source } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Terminal(err) => write!(f, "terminal output failed: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => err.source(),
            Self::Db(err) => err.source(),
            Self::Store(err) => err.source(),
            Self::Binding(err) => err.source(),
            Self::Io { source, .. } => Some(source),
            Self::Terminal(err) => Some(err),
            Self::Logging(_)
            | Self::Record(_)
            | Self::SignedOut
            | Self::NotFound { .. }
            | Self::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BindingError> for CliError {
    fn from(value: BindingError) -> Self {
        Self::Binding(value)
    }
}

impl From<RecordError> for CliError {
    fn from(value: RecordError) -> Self {
        Self::Record(value)
    }
}

/// Prints notifications to stderr so stdout stays machine-readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => eprintln!("{}", notification.message),
            NotificationLevel::Failure => eprintln!("! {}", notification.message),
        }
    }
}

pub fn run_habit(
    conn: &Connection,
    owner: Option<&OwnerId>,
    command: HabitCommand,
) -> Result<(), CliError> {
    let mut habits = HabitService::new(SqliteDocumentStore::try_new(conn)?, ConsoleNotifier);
    match command {
        HabitCommand::List { month } => {
            let (year, month) = parse_month(month.as_deref())?;
            for habit in habits.habits(owner)? {
                let days: Vec<String> = completed_days_in_month(&habit, year, month)
                    .into_iter()
                    .map(|day| format!("{:02}", day.date().day()))
                    .collect();
                println!("{}\t{}\t[{}]", habit.id, habit.text, days.join(","));
            }
        }
        HabitCommand::Add { text } => {
            let id = habits.add_habit(owner, text)?;
            println!("{id}");
        }
        HabitCommand::Toggle { id, date } => {
            let date = match date {
                Some(raw) => DateKey::parse(&raw)?,
                None => DateKey::today(),
            };
            let owner = require_owner(owner)?;
            let habit = find_record(habits.habits(Some(owner))?, &id)?;
            let completions = habits.toggle_completion(Some(owner), &habit, date)?;
            let state = if completions.contains_key(&date) {
                "done"
            } else {
                "open"
            };
            println!("{date}\t{state}");
        }
        HabitCommand::Delete { id } => habits.delete_habit(owner, &RecordId::new(id))?,
    }
    Ok(())
}

pub fn run_assignment(
    conn: &Connection,
    owner: Option<&OwnerId>,
    command: AssignmentCommand,
) -> Result<(), CliError> {
    let mut assignments =
        AssignmentService::new(SqliteDocumentStore::try_new(conn)?, ConsoleNotifier);
    match command {
        AssignmentCommand::List => {
            for assignment in assignments.assignments(owner)? {
                let due = date_from_epoch_ms(assignment.due_date)
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "?".to_string());
                let flags: Vec<String> = ProgressFlag::ALL
                    .iter()
                    .map(|flag| format!("{}={}", flag.as_str(), assignment.flag(*flag)))
                    .collect();
                println!(
                    "{}\t{}\t{}\t{}",
                    assignment.id,
                    due,
                    flags.join(" "),
                    assignment.topic
                );
            }
        }
        AssignmentCommand::Add { topic, due } => {
            let due_date = epoch_ms_at_midnight(DateKey::parse(&due)?.date());
            let id = assignments.add_assignment(owner, topic, due_date)?;
            println!("{id}");
        }
        AssignmentCommand::Set { id, flag, value } => {
            let flag = ProgressFlag::parse(&flag).ok_or_else(|| {
                CliError::Usage(format!(
                    "unknown flag `{flag}`; expected started, in-progress or handed-in"
                ))
            })?;
            assignments.update_assignment(
                owner,
                &RecordId::new(id),
                &AssignmentPatch::flag(flag, value),
            )?;
        }
        AssignmentCommand::Delete { id } => {
            assignments.delete_assignment(owner, &RecordId::new(id))?
        }
    }
    Ok(())
}

pub fn run_item(
    conn: &Connection,
    owner: Option<&OwnerId>,
    command: ItemCommand,
) -> Result<(), CliError> {
    let mut checklist = ChecklistService::new(SqliteDocumentStore::try_new(conn)?, ConsoleNotifier);
    match command {
        ItemCommand::List => {
            let items = checklist.items(owner)?;
            for item in &items {
                let mark = if item.completed { "x" } else { " " };
                println!("{}\t[{mark}] {}", item.id, item.text);
            }
            let (done, total) = completion_summary(&items);
            println!("{done}/{total} done");
        }
        ItemCommand::Add { text } => {
            let id = checklist.add_item(owner, text)?;
            println!("{id}");
        }
        ItemCommand::Toggle { id } => {
            let owner = require_owner(owner)?;
            let item = find_record(checklist.items(Some(owner))?, &id)?;
            let completed = checklist.toggle_item(Some(owner), &item)?;
            println!("{}\t{}", item.id, if completed { "done" } else { "open" });
        }
        ItemCommand::Delete { id } => checklist.delete_item(owner, &RecordId::new(id))?,
    }
    Ok(())
}

pub fn run_note(
    conn: &Connection,
    owner: Option<&OwnerId>,
    command: NoteCommand,
) -> Result<(), CliError> {
    let mut notes = NoteService::new(SqliteDocumentStore::try_new(conn)?, ConsoleNotifier);
    match command {
        NoteCommand::List => {
            for preview in notes.previews(owner)? {
                println!(
                    "{}\t{}\t{}",
                    preview.id,
                    preview.title,
                    preview.preview_text.unwrap_or_default()
                );
            }
        }
        NoteCommand::Show { id } => {
            let owner = require_owner(owner)?;
            let note = find_record(notes.notes(Some(owner))?, &id)?;
            println!("# {}\n\n{}", note.title, note.content);
        }
        NoteCommand::Add { title, content } => {
            let id = notes.add_note(owner, title, content)?;
            println!("{id}");
        }
        NoteCommand::Edit { id, title, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let owner = require_owner(owner)?;
                    find_record(notes.notes(Some(owner))?, &id)?.content
                }
            };
            notes.update_note(owner, &RecordId::new(id), title, content)?;
        }
        NoteCommand::Check { id, line } => {
            let owner = require_owner(owner)?;
            let note = find_record(notes.notes(Some(owner))?, &id)?;
            let content = notes.toggle_checkbox(Some(owner), &note, line)?;
            if let Some(updated) = content.split('\n').nth(line) {
                println!("{updated}");
            }
        }
        NoteCommand::Delete { id } => notes.delete_note(owner, &RecordId::new(id))?,
    }
    Ok(())
}

pub fn run_profile(
    conn: &Connection,
    owner: Option<&OwnerId>,
    command: ProfileCommand,
) -> Result<(), CliError> {
    let mut profile = ProfileBinding::new(
        SqliteDocumentStore::try_new(conn)?,
        SqliteObjectStore::new(conn),
        ConsoleNotifier,
    );
    match command {
        ProfileCommand::Show => match profile.get(owner)? {
            Some(current) => {
                if let Some(name) = current.display_name() {
                    println!("name\t{name}");
                }
                if let Some(email) = &current.email {
                    println!("email\t{email}");
                }
                if let Some(image) = &current.profile_image {
                    println!("image\t{image}");
                }
            }
            None => println!("no profile"),
        },
        ProfileCommand::Set {
            first_name,
            last_name,
            email,
        } => {
            let patch = UserProfile {
                first_name,
                last_name,
                email,
                profile_image: None,
            };
            if patch.is_empty() {
                return Err(CliError::Usage(
                    "nothing to update; pass --first-name, --last-name or --email".to_string(),
                ));
            }
            profile.update(owner, &patch)?;
        }
        ProfileCommand::UploadImage { path, content_type } => {
            let bytes = std::fs::read(&path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            let content_type = content_type
                .or_else(|| image_content_type(&path).map(str::to_string))
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let url = profile.upload_profile_image(owner, &bytes, &content_type)?;
            println!("{url}");
        }
    }
    Ok(())
}

/// Runs a foreground countdown, redrawing once per second.
pub fn run_timer(minutes: u32) -> Result<(), CliError> {
    let mut countdown = Countdown::new(minutes);
    countdown.toggle();
    let mut stdout = std::io::stdout();
    loop {
        print!(
            "\r{} ({:>3.0}%)",
            countdown.display(),
            countdown.progress_percent()
        );
        stdout.flush().map_err(CliError::Terminal)?;
        if countdown.is_finished() {
            break;
        }
        std::thread::sleep(TIMER_TICK);
        countdown.tick(TIMER_TICK);
    }
    println!();
    ConsoleNotifier.notify(Notification::success("Time is up."));
    Ok(())
}

fn require_owner(owner: Option<&OwnerId>) -> Result<&OwnerId, CliError> {
    owner.ok_or(CliError::SignedOut)
}

fn find_record<R: Record>(records: Vec<R>, id: &str) -> Result<R, CliError> {
    records
        .into_iter()
        .find(|record| record.id().as_str() == id)
        .ok_or_else(|| CliError::NotFound {
            label: R::LABEL,
            id: id.to_string(),
        })
}

fn parse_month(raw: Option<&str>) -> Result<(i32, u32), CliError> {
    let date = match raw {
        Some(raw) => DateKey::parse(&format!("{}-01", raw.trim()))?.date(),
        None => DateKey::today().date(),
    };
    Ok((date.year(), date.month()))
}

fn image_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{image_content_type, parse_month, CliError};
    use std::path::Path;

    #[test]
    fn month_argument_parses_year_and_month() {
        assert_eq!(parse_month(Some("2025-06")).unwrap(), (2025, 6));
        assert!(matches!(
            parse_month(Some("June")),
            Err(CliError::Record(_))
        ));
    }

    #[test]
    fn content_type_is_inferred_from_extension() {
        assert_eq!(image_content_type(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(image_content_type(Path::new("me.jpeg")), Some("image/jpeg"));
        assert_eq!(image_content_type(Path::new("notes.txt")), None);
        assert_eq!(image_content_type(Path::new("no_extension")), None);
    }
}
