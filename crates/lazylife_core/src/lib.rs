//! Core domain logic for LazyLife.
//! Owner-scoped remote collections (habits, assignments, checklist items,
//! notes, profile) behind a cached binding with one notification per command.

pub mod binding;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod timer;

pub use binding::{
    BindingError, BindingResult, BindingState, CollectionBinding, IdentityProvider, LogNotifier,
    Notification, NotificationLevel, Notifier, Operation, ProfileBinding, RecordingNotifier,
    StaticIdentity,
};
pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::assignment::{Assignment, AssignmentPatch, NewAssignment, ProgressFlag};
pub use model::checklist::{ChecklistItem, ChecklistPatch, NewChecklistItem};
pub use model::date_key::DateKey;
pub use model::habit::{Habit, HabitPatch, NewHabit};
pub use model::note::{Note, NoteBody};
pub use model::profile::UserProfile;
pub use model::record::{OwnerId, Record, RecordError, RecordId};
pub use service::assignment_service::AssignmentService;
pub use service::checklist_service::ChecklistService;
pub use service::habit_service::HabitService;
pub use service::note_service::NoteService;
pub use store::{
    DocumentStore, ObjectStore, SqliteDocumentStore, SqliteObjectStore, StoreError, StoreResult,
};
pub use timer::{Countdown, Stopwatch};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
