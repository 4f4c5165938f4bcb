//! SQLite-backed document store.
//!
//! # Responsibility
//! - Keep owner-scoped documents as JSON bodies in the `documents` table.
//! - Assign ids (`uuid` v4) and creation timestamps on insert.
//!
//! # Invariants
//! - Every statement filters on `owner_id` and `collection`.
//! - Updates merge top-level keys only; a written key replaces its whole
//!   value, so map-valued fields (habit completions) can shrink.
//! - Read paths reject bodies that are not JSON objects.

use super::{DocumentStore, StoreError, StoreResult};
use crate::model::record::{
    ensure_no_reserved_fields, Document, FieldMap, OwnerId, RecordId, SortKey, RESERVED_FIELDS,
};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT
    id,
    created_at,
    body
FROM documents";

/// Document store over a migrated SQLite connection.
#[derive(Clone, Copy)]
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `InvalidData` when the `documents` table is missing, i.e. the
    ///   connection was not migrated.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'documents'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StoreError::InvalidData(
                "missing required table `documents`".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    fn select_body(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<FieldMap>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body
                 FROM documents
                 WHERE owner_id = ?1 AND collection = ?2 AND id = ?3;",
                params![owner.as_str(), collection, id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|text| parse_body(&text, collection, id.as_str()))
            .transpose()
    }

    fn write_body(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        body: &FieldMap,
    ) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE documents
             SET
                body = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE owner_id = ?1 AND collection = ?2 AND id = ?3;",
            params![owner.as_str(), collection, id.as_str(), encode_body(body)?],
        )?;
        Ok(changed)
    }

    fn insert_with_id(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO documents (owner_id, collection, id, body)
             VALUES (?1, ?2, ?3, ?4);",
            params![owner.as_str(), collection, id.as_str(), encode_body(fields)?],
        )?;
        Ok(())
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn read_collection(
        &self,
        owner: &OwnerId,
        collection: &str,
        sort: SortKey,
    ) -> StoreResult<Vec<Document>> {
        let mut stmt;
        let mut rows = match sort {
            SortKey::CreatedAt => {
                stmt = self.conn.prepare(&format!(
                    "{DOCUMENT_SELECT_SQL}
                     WHERE owner_id = ?1 AND collection = ?2
                     ORDER BY created_at ASC, seq ASC;"
                ))?;
                stmt.query(params![owner.as_str(), collection])?
            }
            SortKey::Field(field) => {
                let path = json_path(field)?;
                stmt = self.conn.prepare(&format!(
                    "{DOCUMENT_SELECT_SQL}
                     WHERE owner_id = ?1 AND collection = ?2
                     ORDER BY json_extract(body, ?3) ASC, created_at ASC, seq ASC;"
                ))?;
                stmt.query(params![owner.as_str(), collection, path])?
            }
        };

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row, collection)?);
        }

        debug!(
            "event=store_read module=store status=ok collection={} count={}",
            collection,
            documents.len()
        );
        Ok(documents)
    }

    fn insert(
        &self,
        owner: &OwnerId,
        collection: &str,
        fields: &FieldMap,
    ) -> StoreResult<RecordId> {
        ensure_no_reserved_fields(fields)?;
        let id = RecordId::new(Uuid::new_v4().to_string());
        self.insert_with_id(owner, collection, &id, fields)?;
        debug!("event=store_insert module=store status=ok collection={collection}");
        Ok(id)
    }

    fn update(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()> {
        ensure_no_reserved_fields(fields)?;
        let tx = self.conn.unchecked_transaction()?;
        let Some(mut body) = self.select_body(owner, collection, id)? else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            });
        };
        merge_top_level(&mut body, fields);
        self.write_body(owner, collection, id, &body)?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, owner: &OwnerId, collection: &str, id: &RecordId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents
             WHERE owner_id = ?1 AND collection = ?2 AND id = ?3;",
            params![owner.as_str(), collection, id.as_str()],
        )?;
        debug!(
            "event=store_delete module=store status=ok collection={} removed={}",
            collection, changed
        );
        Ok(())
    }

    fn get(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
    ) -> StoreResult<Option<Document>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE owner_id = ?1 AND collection = ?2 AND id = ?3;"
        ))?;
        let mut rows = stmt.query(params![owner.as_str(), collection, id.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_document_row(row, collection)?)),
            None => Ok(None),
        }
    }

    fn merge(
        &self,
        owner: &OwnerId,
        collection: &str,
        id: &RecordId,
        fields: &FieldMap,
    ) -> StoreResult<()> {
        ensure_no_reserved_fields(fields)?;
        let tx = self.conn.unchecked_transaction()?;
        match self.select_body(owner, collection, id)? {
            Some(mut body) => {
                merge_top_level(&mut body, fields);
                self.write_body(owner, collection, id, &body)?;
            }
            None => self.insert_with_id(owner, collection, id, fields)?,
        }
        tx.commit()?;
        Ok(())
    }
}

fn merge_top_level(body: &mut FieldMap, fields: &FieldMap) {
    for (key, value) in fields {
        body.insert(key.clone(), value.clone());
    }
}

fn json_path(field: &str) -> StoreResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(StoreError::InvalidData(format!(
            "sort field `{field}` is not a plain identifier"
        )));
    }
    Ok(format!("$.{field}"))
}

fn encode_body(fields: &FieldMap) -> StoreResult<String> {
    serde_json::to_string(fields)
        .map_err(|err| StoreError::InvalidData(format!("failed to encode document body: {err}")))
}

fn parse_body(text: &str, collection: &str, id: &str) -> StoreResult<FieldMap> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        StoreError::InvalidData(format!("invalid json body in {collection}/{id}: {err}"))
    })?;
    let Value::Object(body) = value else {
        return Err(StoreError::InvalidData(format!(
            "document body in {collection}/{id} is not an object"
        )));
    };
    if let Some(key) = RESERVED_FIELDS.iter().find(|key| body.contains_key(**key)) {
        return Err(StoreError::InvalidData(format!(
            "document body in {collection}/{id} contains reserved key `{key}`"
        )));
    }
    Ok(body)
}

fn parse_document_row(row: &Row<'_>, collection: &str) -> StoreResult<Document> {
    let id: String = row.get("id")?;
    let body_text: String = row.get("body")?;
    let fields = parse_body(&body_text, collection, &id)?;
    Ok(Document {
        id: RecordId::new(id),
        created_at: row.get("created_at")?,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::{json_path, merge_top_level};
    use crate::model::record::FieldMap;
    use serde_json::json;

    fn map(value: serde_json::Value) -> FieldMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!("test helper expects an object"),
        }
    }

    #[test]
    fn merge_replaces_nested_maps_instead_of_deep_merging() {
        let mut body = map(json!({"text": "Read", "completions": {"2025-06-01": true}}));
        merge_top_level(&mut body, &map(json!({"completions": {}})));
        assert_eq!(body["completions"], json!({}));
        assert_eq!(body["text"], "Read");
    }

    #[test]
    fn json_path_rejects_injection() {
        assert_eq!(json_path("dueDate").unwrap(), "$.dueDate");
        assert!(json_path("a') OR 1=1 --").is_err());
        assert!(json_path("").is_err());
    }
}
