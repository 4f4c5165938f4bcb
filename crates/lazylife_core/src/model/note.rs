//! Note record.
//!
//! Notes are the one record whose update overwrites a field pair
//! (`title` + `content`) instead of a partial mapping.

use super::record::{
    decode_document, require_text, to_field_map, CachePolicy, Document, FieldMap, Record,
    RecordError, RecordId, SortKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub created_at: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Title and markdown body of a note. Used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteBody {
    pub title: String,
    pub content: String,
}

impl Record for Note {
    type Draft = NoteBody;
    type Patch = NoteBody;

    const COLLECTION: &'static str = "notes";
    const LABEL: &'static str = "note";
    const SORT_KEY: SortKey = SortKey::CreatedAt;
    const CACHE_POLICY: CachePolicy = CachePolicy::PatchInPlace;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn initial_fields(draft: &NoteBody) -> Result<FieldMap, RecordError> {
        require_text("title", &draft.title)?;
        to_field_map(draft)
    }

    fn patch_fields(patch: &NoteBody) -> Result<FieldMap, RecordError> {
        Self::initial_fields(patch)
    }

    fn apply_patch(&mut self, patch: &NoteBody) {
        self.title = patch.title.clone();
        self.content = patch.content.clone();
    }

    fn from_document(document: Document) -> Result<Self, RecordError> {
        decode_document(Self::COLLECTION, document)
    }
}
