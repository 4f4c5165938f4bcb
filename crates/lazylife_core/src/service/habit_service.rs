//! Habit tracker use cases.

use crate::binding::{BindingResult, CollectionBinding, Notifier};
use crate::model::date_key::DateKey;
use crate::model::habit::{Completions, Habit, HabitPatch, NewHabit};
use crate::model::record::{OwnerId, RecordId};
use crate::store::DocumentStore;

pub struct HabitService<S: DocumentStore, N: Notifier> {
    binding: CollectionBinding<Habit, S, N>,
}

impl<S: DocumentStore, N: Notifier> HabitService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            binding: CollectionBinding::new(store, notifier),
        }
    }

    pub fn binding(&self) -> &CollectionBinding<Habit, S, N> {
        &self.binding
    }

    pub fn habits(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<Habit>> {
        self.binding.list(owner)
    }

    pub fn add_habit(
        &mut self,
        owner: Option<&OwnerId>,
        text: impl Into<String>,
    ) -> BindingResult<RecordId> {
        self.binding.create(owner, &NewHabit { text: text.into() })
    }

    pub fn rename_habit(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
        text: impl Into<String>,
    ) -> BindingResult<()> {
        let patch = HabitPatch {
            text: Some(text.into()),
            ..HabitPatch::default()
        };
        self.binding.update(owner, id, &patch)
    }

    pub fn delete_habit(&mut self, owner: Option<&OwnerId>, id: &RecordId) -> BindingResult<()> {
        self.binding.delete(owner, id)
    }

    /// Flips the completion mark of `habit` on `date`.
    ///
    /// Writes the whole completions map computed from the caller's copy;
    /// two concurrent toggles race and the last write wins.
    pub fn toggle_completion(
        &mut self,
        owner: Option<&OwnerId>,
        habit: &Habit,
        date: DateKey,
    ) -> BindingResult<Completions> {
        let next = habit.toggled_completions(date);
        let patch = HabitPatch {
            completions: Some(next.clone()),
            ..HabitPatch::default()
        };
        self.binding.update(owner, &habit.id, &patch)?;
        Ok(next)
    }
}

/// Days of the given month on which `habit` is marked complete.
pub fn completed_days_in_month(habit: &Habit, year: i32, month: u32) -> Vec<DateKey> {
    habit
        .completions
        .iter()
        .filter(|(day, done)| **done && day.is_in_month(year, month))
        .map(|(day, _)| *day)
        .collect()
}
