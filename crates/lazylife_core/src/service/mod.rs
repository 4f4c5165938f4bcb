//! Per-feature use-case services.
//!
//! # Responsibility
//! - Wrap one `CollectionBinding` per feature with the commands its views
//!   issue (add, toggle, edit, delete).
//! - Hold feature rules that sit above plain CRUD: completion toggles,
//!   month filters, markdown helpers.
//!
//! # Invariants
//! - Services never bypass the binding; every write goes through its
//!   notification and cache rules.
//! - Toggles compute the next value from the caller's copy of the record
//!   (no read-modify-write against the store).

pub mod assignment_service;
pub mod checklist_service;
pub mod habit_service;
pub mod note_service;
