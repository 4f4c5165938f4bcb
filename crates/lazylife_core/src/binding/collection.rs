//! Generic read-cache-plus-commands engine for one record type.
//!
//! # Invariants
//! - The cache is keyed by owner; each binding owns exactly one collection.
//! - Snapshots are full replacements read from the store, never diffs.
//! - Only settled, successful commands touch the cache.
//! - Updates are last-write-wins; there is no version check.

use super::error::{BindingError, BindingResult, Operation};
use super::notify::{outcome_message, Notifier};
use crate::model::record::{CachePolicy, OwnerId, Record, RecordId};
use crate::store::{DocumentStore, StoreError};
use log::{info, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Observable lifecycle of one owner's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Owner identity is not known yet.
    Uninitialized,
    /// Owner is known but no fresh snapshot exists; the next read fetches.
    Loading,
    /// The last fetch succeeded and the snapshot is current.
    Ready,
    /// The last fetch failed. Any older snapshot is kept; the next read
    /// retries.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotStatus {
    Stale,
    Ready,
    Failed,
}

struct CacheSlot<R> {
    snapshot: Option<Vec<R>>,
    status: SlotStatus,
}

impl<R> CacheSlot<R> {
    fn new() -> Self {
        Self {
            snapshot: None,
            status: SlotStatus::Stale,
        }
    }
}

/// Binding between views and one owner-scoped remote collection.
pub struct CollectionBinding<R: Record, S: DocumentStore, N: Notifier> {
    store: S,
    notifier: N,
    slots: HashMap<OwnerId, CacheSlot<R>>,
}

impl<R: Record, S: DocumentStore, N: Notifier> CollectionBinding<R, S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            slots: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self, owner: Option<&OwnerId>) -> BindingState {
        let Some(owner) = owner else {
            return BindingState::Uninitialized;
        };
        match self.slots.get(owner).map(|slot| slot.status) {
            Some(SlotStatus::Ready) => BindingState::Ready,
            Some(SlotStatus::Failed) => BindingState::Failed,
            Some(SlotStatus::Stale) | None => BindingState::Loading,
        }
    }

    /// Last snapshot fetched for `owner`, fresh or not.
    pub fn cached(&self, owner: &OwnerId) -> Option<&[R]> {
        self.slots
            .get(owner)
            .and_then(|slot| slot.snapshot.as_deref())
    }

    /// Returns the owner's records in collection order.
    ///
    /// A missing owner yields an empty list without touching the store. A
    /// fresh snapshot is served from cache; otherwise the collection is
    /// fetched.
    ///
    /// # Errors
    /// - `PersistenceFailure` when the fetch fails; the binding moves to
    ///   `Failed` and one failure notification is emitted.
    pub fn list(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<R>> {
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };
        if let Some(slot) = self.slots.get(owner) {
            if slot.status == SlotStatus::Ready {
                if let Some(snapshot) = &slot.snapshot {
                    return Ok(snapshot.clone());
                }
            }
        }
        self.fetch(owner)
    }

    /// Fetches the collection even when the snapshot is fresh.
    pub fn refresh(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<R>> {
        match owner {
            Some(owner) => self.fetch(owner),
            None => Ok(Vec::new()),
        }
    }

    /// Marks the owner's snapshot stale so the next read refetches.
    pub fn invalidate(&mut self, owner: &OwnerId) {
        if let Some(slot) = self.slots.get_mut(owner) {
            slot.status = SlotStatus::Stale;
        }
    }

    /// Creates a record from `draft` and returns its store-assigned id.
    ///
    /// On success the snapshot is invalidated; the new record's position
    /// comes from the store on the next read.
    pub fn create(&mut self, owner: Option<&OwnerId>, draft: &R::Draft) -> BindingResult<RecordId> {
        let started_at = Instant::now();
        let result = self.try_create(owner, draft);
        self.settle(Operation::Add, started_at, result)
    }

    /// Merges `patch` into the record `id`, leaving other fields untouched.
    pub fn update(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
        patch: &R::Patch,
    ) -> BindingResult<()> {
        let started_at = Instant::now();
        let result = self.try_update(owner, id, patch);
        self.settle(Operation::Update, started_at, result)
    }

    /// Deletes the record `id`. Deleting a missing id succeeds.
    pub fn delete(&mut self, owner: Option<&OwnerId>, id: &RecordId) -> BindingResult<()> {
        let started_at = Instant::now();
        let result = self.try_delete(owner, id);
        self.settle(Operation::Delete, started_at, result)
    }

    fn try_create(&mut self, owner: Option<&OwnerId>, draft: &R::Draft) -> BindingResult<RecordId> {
        let owner = owner.ok_or(BindingError::AuthenticationRequired)?;
        let fields = R::initial_fields(draft).map_err(BindingError::InvalidInput)?;
        let id = self
            .store
            .insert(owner, R::COLLECTION, &fields)
            .map_err(|source| persistence(Operation::Add, source, R::LABEL))?;
        self.invalidate(owner);
        Ok(id)
    }

    fn try_update(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
        patch: &R::Patch,
    ) -> BindingResult<()> {
        let owner = owner.ok_or(BindingError::AuthenticationRequired)?;
        let fields = R::patch_fields(patch).map_err(BindingError::InvalidInput)?;
        self.store
            .update(owner, R::COLLECTION, id, &fields)
            .map_err(|source| persistence(Operation::Update, source, R::LABEL))?;

        match R::CACHE_POLICY {
            CachePolicy::Invalidate => self.invalidate(owner),
            CachePolicy::PatchInPlace => {
                let patched = self
                    .slots
                    .get_mut(owner)
                    .and_then(|slot| slot.snapshot.as_mut())
                    .and_then(|snapshot| snapshot.iter_mut().find(|record| record.id() == id))
                    .map(|record| record.apply_patch(patch))
                    .is_some();
                if !patched {
                    self.invalidate(owner);
                }
            }
        }
        Ok(())
    }

    fn try_delete(&mut self, owner: Option<&OwnerId>, id: &RecordId) -> BindingResult<()> {
        let owner = owner.ok_or(BindingError::AuthenticationRequired)?;
        self.store
            .delete(owner, R::COLLECTION, id)
            .map_err(|source| persistence(Operation::Delete, source, R::LABEL))?;

        match R::CACHE_POLICY {
            CachePolicy::Invalidate => self.invalidate(owner),
            CachePolicy::PatchInPlace => {
                if let Some(snapshot) = self
                    .slots
                    .get_mut(owner)
                    .and_then(|slot| slot.snapshot.as_mut())
                {
                    snapshot.retain(|record| record.id() != id);
                }
            }
        }
        Ok(())
    }

    fn fetch(&mut self, owner: &OwnerId) -> BindingResult<Vec<R>> {
        let started_at = Instant::now();
        let result = self
            .store
            .read_collection(owner, R::COLLECTION, R::SORT_KEY)
            .and_then(|documents| {
                documents
                    .into_iter()
                    .map(|document| {
                        R::from_document(document)
                            .map_err(|err| StoreError::InvalidData(err.to_string()))
                    })
                    .collect::<Result<Vec<R>, StoreError>>()
            });

        let slot = self.slots.entry(owner.clone()).or_insert_with(CacheSlot::new);
        match result {
            Ok(records) => {
                slot.snapshot = Some(records.clone());
                slot.status = SlotStatus::Ready;
                info!(
                    "event=binding_load module=binding status=ok collection={} count={} duration_ms={}",
                    R::COLLECTION,
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(records)
            }
            Err(source) => {
                slot.status = SlotStatus::Failed;
                warn!(
                    "event=binding_load module=binding status=error collection={} duration_ms={} error={}",
                    R::COLLECTION,
                    started_at.elapsed().as_millis(),
                    source
                );
                self.notifier
                    .notify(outcome_message(false, Operation::Load, R::LABEL));
                Err(persistence(Operation::Load, source, R::LABEL))
            }
        }
    }

    /// Fails a command that was refused before reaching the store, with the
    /// same logging and single failure notification as any other command.
    pub(crate) fn reject<T>(&self, operation: Operation, err: BindingError) -> BindingResult<T> {
        self.settle(operation, Instant::now(), Err(err))
    }

    fn settle<T>(
        &self,
        operation: Operation,
        started_at: Instant,
        result: BindingResult<T>,
    ) -> BindingResult<T> {
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event=binding_command module=binding status=ok operation={} collection={} duration_ms={}",
                operation.as_str(),
                R::COLLECTION,
                duration_ms
            ),
            Err(err) => warn!(
                "event=binding_command module=binding status=error operation={} collection={} duration_ms={} error_code={}",
                operation.as_str(),
                R::COLLECTION,
                duration_ms,
                error_code(err)
            ),
        }
        self.notifier
            .notify(outcome_message(result.is_ok(), operation, R::LABEL));
        result
    }
}

pub(super) fn persistence(
    operation: Operation,
    source: StoreError,
    label: &'static str,
) -> BindingError {
    BindingError::PersistenceFailure {
        operation,
        label,
        source,
    }
}

pub(super) fn error_code(err: &BindingError) -> &'static str {
    match err {
        BindingError::AuthenticationRequired => "authentication_required",
        BindingError::InvalidInput(_) => "invalid_input",
        BindingError::PersistenceFailure { .. } => "persistence_failure",
    }
}
