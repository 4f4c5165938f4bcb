//! Checklist item record.

use super::record::{
    decode_document, require_text, to_field_map, CachePolicy, Document, FieldMap, Record,
    RecordError, RecordId, SortKey,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One goal on the checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: RecordId,
    pub created_at: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChecklistItem {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Record for ChecklistItem {
    type Draft = NewChecklistItem;
    type Patch = ChecklistPatch;

    const COLLECTION: &'static str = "trackerItems";
    const LABEL: &'static str = "checklist item";
    const SORT_KEY: SortKey = SortKey::CreatedAt;
    const CACHE_POLICY: CachePolicy = CachePolicy::Invalidate;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn initial_fields(draft: &NewChecklistItem) -> Result<FieldMap, RecordError> {
        require_text("text", &draft.text)?;
        to_field_map(&json!({
            "text": draft.text,
            "completed": false,
        }))
    }

    fn patch_fields(patch: &ChecklistPatch) -> Result<FieldMap, RecordError> {
        if let Some(text) = patch.text.as_deref() {
            require_text("text", text)?;
        }
        to_field_map(patch)
    }

    fn apply_patch(&mut self, patch: &ChecklistPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }

    fn from_document(document: Document) -> Result<Self, RecordError> {
        decode_document(Self::COLLECTION, document)
    }
}
