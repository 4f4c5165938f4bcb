use lazylife_core::db::open_db_in_memory;
use lazylife_core::model::record::{FieldMap, SortKey};
use lazylife_core::store::StoredObject;
use lazylife_core::{
    DocumentStore, ObjectStore, OwnerId, RecordError, RecordId, SqliteDocumentStore,
    SqliteObjectStore, StoreError,
};
use rusqlite::Connection;
use serde_json::json;

fn fields(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn owner(name: &str) -> OwnerId {
    OwnerId::parse(name).unwrap()
}

#[test]
fn insert_assigns_id_and_created_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    let id = store
        .insert(&alice, "habits", &fields(json!({"text": "Read"})))
        .unwrap();
    assert!(!id.as_str().is_empty());

    let document = store.get(&alice, "habits", &id).unwrap().unwrap();
    assert_eq!(document.id, id);
    assert!(document.created_at > 0);
    assert_eq!(document.fields.get("text"), Some(&json!("Read")));
}

#[test]
fn read_collection_keeps_insertion_order_for_created_at_sort() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    for text in ["one", "two", "three"] {
        store
            .insert(&alice, "trackerItems", &fields(json!({"text": text})))
            .unwrap();
    }

    let texts: Vec<_> = store
        .read_collection(&alice, "trackerItems", SortKey::CreatedAt)
        .unwrap()
        .into_iter()
        .map(|document| document.fields["text"].clone())
        .collect();
    assert_eq!(texts, vec![json!("one"), json!("two"), json!("three")]);
}

#[test]
fn read_collection_orders_by_field_value() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    for (topic, due) in [("Lab", 300_i64), ("Essay", 100), ("Quiz", 200)] {
        store
            .insert(
                &alice,
                "assignments",
                &fields(json!({"topic": topic, "dueDate": due})),
            )
            .unwrap();
    }

    let topics: Vec<_> = store
        .read_collection(&alice, "assignments", SortKey::Field("dueDate"))
        .unwrap()
        .into_iter()
        .map(|document| document.fields["topic"].clone())
        .collect();
    assert_eq!(topics, vec![json!("Essay"), json!("Quiz"), json!("Lab")]);
}

#[test]
fn read_collection_rejects_non_identifier_sort_field() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let err = store
        .read_collection(&owner("alice"), "assignments", SortKey::Field("due date"))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn update_merges_top_level_fields_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    let id = store
        .insert(
            &alice,
            "habits",
            &fields(json!({
                "text": "Read",
                "completions": {"2025-06-01": true, "2025-06-02": true}
            })),
        )
        .unwrap();

    store
        .update(
            &alice,
            "habits",
            &id,
            &fields(json!({"completions": {"2025-06-02": true}})),
        )
        .unwrap();

    let document = store.get(&alice, "habits", &id).unwrap().unwrap();
    assert_eq!(document.fields["text"], json!("Read"));
    assert_eq!(document.fields["completions"], json!({"2025-06-02": true}));
}

#[test]
fn update_missing_document_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let err = store
        .update(
            &owner("alice"),
            "notes",
            &RecordId::new("ghost"),
            &fields(json!({"title": "x"})),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    let id = store
        .insert(&alice, "notes", &fields(json!({"title": "Draft"})))
        .unwrap();
    store.delete(&alice, "notes", &id).unwrap();
    store.delete(&alice, "notes", &id).unwrap();

    assert!(store.get(&alice, "notes", &id).unwrap().is_none());
}

#[test]
fn reserved_fields_are_rejected_on_every_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");

    let err = store
        .insert(&alice, "notes", &fields(json!({"title": "x", "ownerId": "bob"})))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Rejected(RecordError::ReservedField(ref field)) if field == "ownerId"
    ));

    let id = store
        .insert(&alice, "notes", &fields(json!({"title": "x"})))
        .unwrap();
    let err = store
        .update(&alice, "notes", &id, &fields(json!({"createdAt": 1})))
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));
}

#[test]
fn owners_never_see_each_other() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");
    let bob = owner("bob");

    let id = store
        .insert(&alice, "habits", &fields(json!({"text": "Run"})))
        .unwrap();

    assert!(store
        .read_collection(&bob, "habits", SortKey::CreatedAt)
        .unwrap()
        .is_empty());
    assert!(store.get(&bob, "habits", &id).unwrap().is_none());
    assert!(matches!(
        store
            .update(&bob, "habits", &id, &fields(json!({"text": "Walk"})))
            .unwrap_err(),
        StoreError::NotFound { .. }
    ));

    store.delete(&bob, "habits", &id).unwrap();
    assert!(store.get(&alice, "habits", &id).unwrap().is_some());
}

#[test]
fn merge_creates_then_updates_fixed_id_document() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let alice = owner("alice");
    let me = RecordId::new("me");

    store
        .merge(&alice, "profile", &me, &fields(json!({"firstName": "Ada"})))
        .unwrap();
    store
        .merge(&alice, "profile", &me, &fields(json!({"lastName": "Lovelace"})))
        .unwrap();

    let document = store.get(&alice, "profile", &me).unwrap().unwrap();
    assert_eq!(document.fields["firstName"], json!("Ada"));
    assert_eq!(document.fields["lastName"], json!("Lovelace"));
}

#[test]
fn corrupt_body_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (owner_id, collection, id, body)
         VALUES ('alice', 'notes', 'n1', '[1, 2]');",
        [],
    )
    .unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();

    let err = store
        .read_collection(&owner("alice"), "notes", SortKey::CreatedAt)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteDocumentStore::try_new(&conn),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn uploaded_object_is_fetchable_by_url() {
    let conn = open_db_in_memory().unwrap();
    let objects = SqliteObjectStore::new(&conn);
    let alice = owner("alice");

    let url = objects.upload(&alice, &[0x89, 0x50, 0x4e, 0x47], "image/png").unwrap();
    assert!(url.starts_with("lazylife-object://alice/"));

    let fetched = objects.fetch(&url).unwrap().unwrap();
    assert_eq!(
        fetched,
        StoredObject {
            owner_id: alice,
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    );
}

#[test]
fn object_urls_are_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let objects = SqliteObjectStore::new(&conn);

    let url = objects
        .upload(&owner("alice"), b"gif89a", "image/gif")
        .unwrap();
    let forged = url.replacen("alice", "bob", 1);
    assert!(objects.fetch(&forged).unwrap().is_none());
}
