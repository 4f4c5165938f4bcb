//! Record contract shared by every collection binding.
//!
//! # Responsibility
//! - Name the identity types (`OwnerId`, `RecordId`) used across the crate.
//! - Describe how a typed record maps to and from store field mappings.
//!
//! # Invariants
//! - `OwnerId` is never blank.
//! - Field mappings produced here never contain reserved keys.
//! - `from_document` rejects documents that do not fit the record schema.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Top-level field mapping as exchanged with the document store.
pub type FieldMap = Map<String, Value>;

/// Keys owned by the store; callers can never write them.
pub const RESERVED_FIELDS: &[&str] = &[FIELD_ID, FIELD_OWNER_ID, FIELD_CREATED_AT];

pub const FIELD_ID: &str = "id";
pub const FIELD_OWNER_ID: &str = "ownerId";
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Identity of the user owning a partition of every collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses an owner identity, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - `RecordError::EmptyOwnerId` when the value is blank.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, RecordError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecordError::EmptyOwnerId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque store-assigned document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an identifier handed out by a store implementation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One document as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    /// Store-assigned creation time in epoch milliseconds.
    pub created_at: i64,
    /// Feature fields, without reserved keys.
    pub fields: FieldMap,
}

/// Ordering applied by the store when reading a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending store creation time.
    CreatedAt,
    /// Ascending value of one top-level field.
    Field(&'static str),
}

/// How a binding reconciles its cache after a successful update/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Drop the snapshot; the next read refetches.
    Invalidate,
    /// Patch or filter the cached snapshot directly.
    PatchInPlace,
}

/// Record-level validation and (de)serialization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    EmptyOwnerId,
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    ReservedField(String),
    InvalidDateKey(String),
    InvalidContentType(String),
    EmptyUpload,
    /// The addressed markdown line is not a task-list checkbox.
    NotACheckbox { line: usize },
    Encode(String),
    Decode {
        collection: &'static str,
        id: String,
        message: String,
    },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwnerId => write!(f, "owner id cannot be empty"),
            Self::BlankField(field) => write!(f, "`{field}` cannot be blank"),
            Self::ReservedField(field) => write!(f, "`{field}` is assigned by the store"),
            Self::InvalidDateKey(value) => {
                write!(f, "invalid date key `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidContentType(value) => {
                write!(f, "unsupported content type `{value}`; expected image/*")
            }
            Self::EmptyUpload => write!(f, "upload payload is empty"),
            Self::NotACheckbox { line } => write!(f, "line {line} is not a checkbox"),
            Self::Encode(message) => write!(f, "failed to encode fields: {message}"),
            Self::Decode {
                collection,
                id,
                message,
            } => write!(f, "invalid document {collection}/{id}: {message}"),
        }
    }
}

impl Error for RecordError {}

/// Typed record stored in one owner-scoped collection.
///
/// Implementations are plain data; the generic binding supplies caching,
/// notifications and error mapping.
pub trait Record: Clone + Sized {
    /// Create input (feature fields only).
    type Draft;
    /// Partial update input.
    type Patch;

    /// Collection name inside the owner partition.
    const COLLECTION: &'static str;
    /// Lowercase label used in notifications, e.g. `habit`.
    const LABEL: &'static str;
    const SORT_KEY: SortKey;
    const CACHE_POLICY: CachePolicy;

    fn id(&self) -> &RecordId;

    /// Builds the initial field mapping, defaults included.
    fn initial_fields(draft: &Self::Draft) -> Result<FieldMap, RecordError>;

    /// Builds the partial mapping written by an update.
    fn patch_fields(patch: &Self::Patch) -> Result<FieldMap, RecordError>;

    /// Applies a patch to a cached copy, mirroring the store-side merge.
    fn apply_patch(&mut self, patch: &Self::Patch);

    fn from_document(document: Document) -> Result<Self, RecordError>;
}

/// Serializes a value into a top-level field mapping.
///
/// # Errors
/// - `Encode` when the value is not a JSON object.
/// - `ReservedField` when a store-owned key is present.
pub fn to_field_map<T: Serialize>(value: &T) -> Result<FieldMap, RecordError> {
    let map = match serde_json::to_value(value).map_err(|err| RecordError::Encode(err.to_string()))?
    {
        Value::Object(map) => map,
        other => {
            return Err(RecordError::Encode(format!(
                "expected an object, got `{other}`"
            )))
        }
    };
    ensure_no_reserved_fields(&map)?;
    Ok(map)
}

/// Rejects field mappings that try to write store-owned keys.
pub fn ensure_no_reserved_fields(fields: &FieldMap) -> Result<(), RecordError> {
    match RESERVED_FIELDS.iter().find(|key| fields.contains_key(**key)) {
        Some(key) => Err(RecordError::ReservedField((*key).to_string())),
        None => Ok(()),
    }
}

/// Decodes a store document into a typed record.
///
/// `id` and `createdAt` are injected from the document envelope, so record
/// structs can declare them as ordinary fields.
pub fn decode_document<T: DeserializeOwned>(
    collection: &'static str,
    document: Document,
) -> Result<T, RecordError> {
    let Document {
        id,
        created_at,
        mut fields,
    } = document;
    let id_text = id.as_str().to_string();
    fields.insert(FIELD_ID.to_string(), Value::String(id_text.clone()));
    fields.insert(FIELD_CREATED_AT.to_string(), Value::from(created_at));

    serde_json::from_value(Value::Object(fields)).map_err(|err| RecordError::Decode {
        collection,
        id: id_text,
        message: err.to_string(),
    })
}

/// Rejects blank required text.
pub fn require_text(field: &'static str, value: &str) -> Result<(), RecordError> {
    if value.trim().is_empty() {
        return Err(RecordError::BlankField(field));
    }
    Ok(())
}
