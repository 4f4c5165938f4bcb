//! Typed records for every remote collection.
//!
//! # Responsibility
//! - Define one explicit schema per feature instead of free-form documents.
//! - Validate the store's returned shape at the decode boundary.
//!
//! # Invariants
//! - Every record carries a store-assigned `RecordId` and `created_at`.
//! - Drafts never carry `id`, `ownerId` or `createdAt`.

pub mod assignment;
pub mod checklist;
pub mod date_key;
pub mod habit;
pub mod note;
pub mod profile;
pub mod record;
