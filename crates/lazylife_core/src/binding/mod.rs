//! Remote collection bindings.
//!
//! # Responsibility
//! - Give views a read-through cached snapshot of one owner-scoped
//!   collection plus create/update/delete commands.
//! - Keep the snapshot consistent with the store after each command settles.
//! - Surface every command outcome as exactly one user notification.
//!
//! # Invariants
//! - A missing owner never reaches the store: reads return empty, commands
//!   fail with `AuthenticationRequired`.
//! - A failed command leaves the cached snapshot untouched.
//! - No retries; the caller re-issues a failed command explicitly.

mod collection;
mod error;
mod identity;
mod notify;
mod profile;

pub use collection::{BindingState, CollectionBinding};
pub use error::{BindingError, BindingResult, Operation};
pub use identity::{IdentityProvider, StaticIdentity};
pub use notify::{LogNotifier, Notification, NotificationLevel, Notifier, RecordingNotifier};
pub use profile::ProfileBinding;
