//! Checklist use cases.

use crate::binding::{BindingResult, CollectionBinding, Notifier};
use crate::model::checklist::{ChecklistItem, ChecklistPatch, NewChecklistItem};
use crate::model::record::{OwnerId, RecordId};
use crate::store::DocumentStore;

pub struct ChecklistService<S: DocumentStore, N: Notifier> {
    binding: CollectionBinding<ChecklistItem, S, N>,
}

impl<S: DocumentStore, N: Notifier> ChecklistService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            binding: CollectionBinding::new(store, notifier),
        }
    }

    pub fn binding(&self) -> &CollectionBinding<ChecklistItem, S, N> {
        &self.binding
    }

    pub fn items(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<ChecklistItem>> {
        self.binding.list(owner)
    }

    pub fn add_item(
        &mut self,
        owner: Option<&OwnerId>,
        text: impl Into<String>,
    ) -> BindingResult<RecordId> {
        self.binding
            .create(owner, &NewChecklistItem { text: text.into() })
    }

    /// Writes the negation of `item.completed` and returns the new value.
    pub fn toggle_item(
        &mut self,
        owner: Option<&OwnerId>,
        item: &ChecklistItem,
    ) -> BindingResult<bool> {
        let completed = !item.completed;
        let patch = ChecklistPatch {
            completed: Some(completed),
            ..ChecklistPatch::default()
        };
        self.binding.update(owner, &item.id, &patch)?;
        Ok(completed)
    }

    pub fn delete_item(&mut self, owner: Option<&OwnerId>, id: &RecordId) -> BindingResult<()> {
        self.binding.delete(owner, id)
    }
}

/// `(completed, total)` counts for a progress header.
pub fn completion_summary(items: &[ChecklistItem]) -> (usize, usize) {
    let done = items.iter().filter(|item| item.completed).count();
    (done, items.len())
}
