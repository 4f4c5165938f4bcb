//! Habit record.
//!
//! # Invariants
//! - `completions` holds at most one entry per calendar day (map key).
//! - Only `true` entries are kept; un-marking a day removes its key.

use super::date_key::DateKey;
use super::record::{
    decode_document, require_text, to_field_map, CachePolicy, Document, FieldMap, Record,
    RecordError, RecordId, SortKey,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Completion marks keyed by day.
pub type Completions = BTreeMap<DateKey, bool>;

/// One tracked habit with its per-day completion marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: RecordId,
    pub created_at: i64,
    pub text: String,
    #[serde(default)]
    pub completions: Completions,
}

impl Habit {
    pub fn is_completed_on(&self, date: DateKey) -> bool {
        self.completions.get(&date).copied().unwrap_or(false)
    }

    /// Returns the completions map with `date` flipped.
    ///
    /// Marked days are removed, unmarked days are inserted as `true`; the
    /// result never holds a duplicate or a `false` entry.
    pub fn toggled_completions(&self, date: DateKey) -> Completions {
        let mut next = self.completions.clone();
        if next.remove(&date).is_none() {
            next.insert(date, true);
        }
        next
    }
}

/// Create input for a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub text: String,
}

/// Partial update for a habit. `completions` replaces the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completions: Option<Completions>,
}

impl Record for Habit {
    type Draft = NewHabit;
    type Patch = HabitPatch;

    const COLLECTION: &'static str = "habits";
    const LABEL: &'static str = "habit";
    const SORT_KEY: SortKey = SortKey::CreatedAt;
    const CACHE_POLICY: CachePolicy = CachePolicy::Invalidate;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn initial_fields(draft: &NewHabit) -> Result<FieldMap, RecordError> {
        require_text("text", &draft.text)?;
        to_field_map(&json!({
            "text": draft.text,
            "completions": {},
        }))
    }

    fn patch_fields(patch: &HabitPatch) -> Result<FieldMap, RecordError> {
        if let Some(text) = patch.text.as_deref() {
            require_text("text", text)?;
        }
        to_field_map(patch)
    }

    fn apply_patch(&mut self, patch: &HabitPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completions) = &patch.completions {
            self.completions = completions.clone();
        }
    }

    fn from_document(document: Document) -> Result<Self, RecordError> {
        let mut habit: Habit = decode_document(Self::COLLECTION, document)?;
        habit.completions.retain(|_, done| *done);
        Ok(habit)
    }
}
