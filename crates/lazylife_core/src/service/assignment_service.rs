//! Assignment tracker use cases.

use crate::binding::{BindingResult, CollectionBinding, Notifier};
use crate::model::assignment::{Assignment, AssignmentPatch, NewAssignment, ProgressFlag};
use crate::model::date_key::date_from_epoch_ms;
use crate::model::record::{OwnerId, RecordId};
use crate::store::DocumentStore;
use chrono::Datelike;

pub struct AssignmentService<S: DocumentStore, N: Notifier> {
    binding: CollectionBinding<Assignment, S, N>,
}

impl<S: DocumentStore, N: Notifier> AssignmentService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            binding: CollectionBinding::new(store, notifier),
        }
    }

    pub fn binding(&self) -> &CollectionBinding<Assignment, S, N> {
        &self.binding
    }

    /// Assignments ordered by due date, earliest first.
    pub fn assignments(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<Assignment>> {
        self.binding.list(owner)
    }

    pub fn add_assignment(
        &mut self,
        owner: Option<&OwnerId>,
        topic: impl Into<String>,
        due_date: i64,
    ) -> BindingResult<RecordId> {
        let draft = NewAssignment {
            topic: topic.into(),
            due_date,
        };
        self.binding.create(owner, &draft)
    }

    pub fn update_assignment(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
        patch: &AssignmentPatch,
    ) -> BindingResult<()> {
        self.binding.update(owner, id, patch)
    }

    /// Writes the negation of one progress flag; the other two are untouched.
    pub fn toggle_progress(
        &mut self,
        owner: Option<&OwnerId>,
        assignment: &Assignment,
        flag: ProgressFlag,
    ) -> BindingResult<bool> {
        let value = !assignment.flag(flag);
        self.binding
            .update(owner, &assignment.id, &AssignmentPatch::flag(flag, value))?;
        Ok(value)
    }

    pub fn delete_assignment(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
    ) -> BindingResult<()> {
        self.binding.delete(owner, id)
    }
}

/// Assignments due in the given UTC calendar month, in input order.
pub fn due_in_month(assignments: &[Assignment], year: i32, month: u32) -> Vec<&Assignment> {
    assignments
        .iter()
        .filter(|assignment| {
            date_from_epoch_ms(assignment.due_date)
                .map(|date| date.year() == year && date.month() == month)
                .unwrap_or(false)
        })
        .collect()
}
