//! External store boundary.
//!
//! # Responsibility
//! - Define the document and object store contracts the bindings depend on.
//! - Provide SQLite reference implementations for embedding and tests.
//!
//! # Invariants
//! - Every operation is scoped by `OwnerId`; nothing crosses partitions.
//! - Store-owned keys (`id`, `ownerId`, `createdAt`) are never accepted in
//!   caller field mappings.
//! - Deleting a missing document succeeds; updating one fails `NotFound`.

use crate::db::DbError;
use crate::model::record::{Document, FieldMap, OwnerId, RecordError, RecordId, SortKey};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_documents;
pub mod sqlite_objects;

pub use sqlite_documents::SqliteDocumentStore;
pub use sqlite_objects::SqliteObjectStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a store implementation.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound {
        collection: String,
        id: RecordId,
    },
    /// The request itself was refused before touching storage.
    Rejected(RecordError),
    /// Persisted state does not have the expected shape.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => write!(f, "document not found: {collection}/{id}"),
            Self::Rejected(err) => write!(f, "request rejected: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Rejected(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordError> for StoreError {
    fn from(value: RecordError) -> Self {
        Self::Rejected(value)
    }
}

/// Owner-partitioned document collections.
pub trait DocumentStore {
    /// Reads a whole collection in ascending `sort` order.
    fn read_collection(
        &self,
        owner: &OwnerId,
        collection: &str,
        sort: SortKey,
    ) -> StoreResult<Vec<Document>>;

    /// Inserts a new document and returns its store-assigned id.
    fn insert(&self, owner: &OwnerId, collection: &str, fields: &FieldMap)
        -> StoreResult<RecordId>;

    /// Shallow-merges `fields` into an existing document.
    fn update(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()>;

    /// Removes a document. Missing documents are not an error.
    fn delete(&self, owner: &OwnerId, collection: &str, id: &RecordId) -> StoreResult<()>;

    fn get(&self, owner: &OwnerId, collection: &str, id: &RecordId)
        -> StoreResult<Option<Document>>;

    /// Shallow-merges `fields`, creating the document under `id` if absent.
    fn merge(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn read_collection(
        &self,
        owner: &OwnerId,
        collection: &str,
        sort: SortKey,
    ) -> StoreResult<Vec<Document>> {
        (**self).read_collection(owner, collection, sort)
    }

    fn insert(
        &self,
        owner: &OwnerId,
        collection: &str,
        fields: &FieldMap,
    ) -> StoreResult<RecordId> {
        (**self).insert(owner, collection, fields)
    }

    fn update(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()> {
        (**self).update(owner, collection, id, fields)
    }

    fn delete(&self, owner: &OwnerId, collection: &str, id: &RecordId) -> StoreResult<()> {
        (**self).delete(owner, collection, id)
    }

    fn get(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>> {
        (**self).get(owner, collection, id)
    }

    fn merge(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()> {
        (**self).merge(owner, collection, id, fields)
    }
}

/// Binary object as kept by an object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub owner_id: OwnerId,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Binary uploads addressed by retrievable URLs.
pub trait ObjectStore {
    /// Stores `bytes` for `owner` and returns a URL that `fetch` resolves.
    fn upload(&self, owner: &OwnerId, bytes: &[u8], content_type: &str) -> StoreResult<String>;

    fn fetch(&self, url: &str) -> StoreResult<Option<StoredObject>>;

    /// Removes the object behind `url`. Removing a missing object succeeds.
    fn delete(&self, url: &str) -> StoreResult<()>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn upload(&self, owner: &OwnerId, bytes: &[u8], content_type: &str) -> StoreResult<String> {
        (**self).upload(owner, bytes, content_type)
    }

    fn fetch(&self, url: &str) -> StoreResult<Option<StoredObject>> {
        (**self).fetch(url)
    }

    fn delete(&self, url: &str) -> StoreResult<()> {
        (**self).delete(url)
    }
}
