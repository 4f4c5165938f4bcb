//! SQLite-backed binary object store.
//!
//! Objects are addressed as `lazylife-object://<owner>/<uuid>`.

use super::{ObjectStore, StoreError, StoreResult, StoredObject};
use crate::model::record::OwnerId;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

pub const OBJECT_URL_SCHEME: &str = "lazylife-object://";

#[derive(Clone, Copy)]
pub struct SqliteObjectStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteObjectStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ObjectStore for SqliteObjectStore<'_> {
    fn upload(&self, owner: &OwnerId, bytes: &[u8], content_type: &str) -> StoreResult<String> {
        let object_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO objects (id, owner_id, content_type, bytes)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                object_id.to_string(),
                owner.as_str(),
                content_type,
                bytes
            ],
        )?;
        debug!(
            "event=object_upload module=store status=ok size_bytes={}",
            bytes.len()
        );
        Ok(object_url(owner, object_id))
    }

    fn fetch(&self, url: &str) -> StoreResult<Option<StoredObject>> {
        let (owner, object_id) = parse_object_url(url)?;
        let row = self
            .conn
            .query_row(
                "SELECT content_type, bytes
                 FROM objects
                 WHERE id = ?1 AND owner_id = ?2;",
                params![object_id.to_string(), owner.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(content_type, bytes)| StoredObject {
            owner_id: owner,
            content_type,
            bytes,
        }))
    }

    fn delete(&self, url: &str) -> StoreResult<()> {
        let (owner, object_id) = parse_object_url(url)?;
        let removed = self.conn.execute(
            "DELETE FROM objects WHERE id = ?1 AND owner_id = ?2;",
            params![object_id.to_string(), owner.as_str()],
        )?;
        debug!("event=object_delete module=store status=ok removed={removed}");
        Ok(())
    }
}

fn object_url(owner: &OwnerId, object_id: Uuid) -> String {
    format!("{OBJECT_URL_SCHEME}{}/{object_id}", owner.as_str())
}

fn parse_object_url(url: &str) -> StoreResult<(OwnerId, Uuid)> {
    let invalid = || StoreError::InvalidData(format!("not an object url: `{url}`"));
    let rest = url.strip_prefix(OBJECT_URL_SCHEME).ok_or_else(invalid)?;
    // Owner ids may contain `/`; the object id is always the last segment.
    let (owner, object_id) = rest.rsplit_once('/').ok_or_else(invalid)?;
    let owner = OwnerId::parse(owner).map_err(|_| invalid())?;
    let object_id = Uuid::parse_str(object_id).map_err(|_| invalid())?;
    Ok((owner, object_id))
}

#[cfg(test)]
mod tests {
    use super::{object_url, parse_object_url, SqliteObjectStore};
    use crate::db::open_db_in_memory;
    use crate::model::record::OwnerId;
    use crate::store::ObjectStore;
    use uuid::Uuid;

    #[test]
    fn delete_removes_only_the_addressed_object() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteObjectStore::new(&conn);
        let owner = OwnerId::parse("alice").unwrap();

        let kept = store.upload(&owner, b"keep", "image/png").unwrap();
        let dropped = store.upload(&owner, b"drop", "image/png").unwrap();
        store.delete(&dropped).unwrap();

        assert!(store.fetch(&dropped).unwrap().is_none());
        assert_eq!(store.fetch(&kept).unwrap().unwrap().bytes, b"keep");
        store.delete(&dropped).unwrap();
        assert!(store.delete("https://example.com/a.png").is_err());
    }

    #[test]
    fn url_round_trips_owner_with_slash() {
        let owner = OwnerId::parse("team/alice").unwrap();
        let id = Uuid::new_v4();
        let (parsed_owner, parsed_id) = parse_object_url(&object_url(&owner, id)).unwrap();
        assert_eq!(parsed_owner, owner);
        assert_eq!(parsed_id, id);
    }

    #[test]
    fn foreign_urls_are_rejected() {
        assert!(parse_object_url("https://example.com/a.png").is_err());
        assert!(parse_object_url("lazylife-object://alice/not-a-uuid").is_err());
    }
}
