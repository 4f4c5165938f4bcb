//! Assignment record with three independent progress flags.
//!
//! # Invariants
//! - New assignments start with every progress flag `false`.
//! - Flags are independent; setting one never touches the others.

use super::record::{
    decode_document, require_text, to_field_map, CachePolicy, Document, FieldMap, Record,
    RecordError, RecordId, SortKey,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const FIELD_DUE_DATE: &str = "dueDate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: RecordId,
    pub created_at: i64,
    pub topic: String,
    /// Due time in epoch milliseconds.
    pub due_date: i64,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub handed_in: bool,
}

/// Progress checkpoints shown as columns on the assignment tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressFlag {
    Started,
    InProgress,
    HandedIn,
}

impl ProgressFlag {
    pub const ALL: [ProgressFlag; 3] = [Self::Started, Self::InProgress, Self::HandedIn];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::InProgress => "in_progress",
            Self::HandedIn => "handed_in",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "started" => Some(Self::Started),
            "in_progress" | "inprogress" => Some(Self::InProgress),
            "handed_in" | "handedin" => Some(Self::HandedIn),
            _ => None,
        }
    }
}

impl Assignment {
    pub fn flag(&self, flag: ProgressFlag) -> bool {
        match flag {
            ProgressFlag::Started => self.started,
            ProgressFlag::InProgress => self.in_progress,
            ProgressFlag::HandedIn => self.handed_in,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub topic: String,
    pub due_date: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handed_in: Option<bool>,
}

impl AssignmentPatch {
    /// Patch that writes exactly one progress flag.
    pub fn flag(flag: ProgressFlag, value: bool) -> Self {
        let mut patch = Self::default();
        match flag {
            ProgressFlag::Started => patch.started = Some(value),
            ProgressFlag::InProgress => patch.in_progress = Some(value),
            ProgressFlag::HandedIn => patch.handed_in = Some(value),
        }
        patch
    }
}

impl Record for Assignment {
    type Draft = NewAssignment;
    type Patch = AssignmentPatch;

    const COLLECTION: &'static str = "assignments";
    const LABEL: &'static str = "assignment";
    const SORT_KEY: SortKey = SortKey::Field(FIELD_DUE_DATE);
    const CACHE_POLICY: CachePolicy = CachePolicy::Invalidate;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn initial_fields(draft: &NewAssignment) -> Result<FieldMap, RecordError> {
        require_text("topic", &draft.topic)?;
        to_field_map(&json!({
            "topic": draft.topic,
            FIELD_DUE_DATE: draft.due_date,
            "started": false,
            "inProgress": false,
            "handedIn": false,
        }))
    }

    fn patch_fields(patch: &AssignmentPatch) -> Result<FieldMap, RecordError> {
        if let Some(topic) = patch.topic.as_deref() {
            require_text("topic", topic)?;
        }
        to_field_map(patch)
    }

    fn apply_patch(&mut self, patch: &AssignmentPatch) {
        if let Some(topic) = &patch.topic {
            self.topic = topic.clone();
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(started) = patch.started {
            self.started = started;
        }
        if let Some(in_progress) = patch.in_progress {
            self.in_progress = in_progress;
        }
        if let Some(handed_in) = patch.handed_in {
            self.handed_in = handed_in;
        }
    }

    fn from_document(document: Document) -> Result<Self, RecordError> {
        decode_document(Self::COLLECTION, document)
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignment, AssignmentPatch, NewAssignment, ProgressFlag};
    use crate::model::record::Record;

    #[test]
    fn initial_fields_start_with_all_flags_cleared() {
        let fields = Assignment::initial_fields(&NewAssignment {
            topic: "Essay".to_string(),
            due_date: 1_748_736_000_000,
        })
        .unwrap();
        assert_eq!(fields["dueDate"], 1_748_736_000_000_i64);
        for key in ["started", "inProgress", "handedIn"] {
            assert_eq!(fields[key], false, "{key} should start false");
        }
    }

    #[test]
    fn flag_patch_writes_a_single_camel_case_key() {
        let fields = Assignment::patch_fields(&AssignmentPatch::flag(ProgressFlag::HandedIn, true))
            .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["handedIn"], true);
    }

    #[test]
    fn progress_flag_parse_accepts_cli_spellings() {
        assert_eq!(ProgressFlag::parse("in-progress"), Some(ProgressFlag::InProgress));
        assert_eq!(ProgressFlag::parse("HANDED_IN"), Some(ProgressFlag::HandedIn));
        assert_eq!(ProgressFlag::parse("done"), None);
    }
}
