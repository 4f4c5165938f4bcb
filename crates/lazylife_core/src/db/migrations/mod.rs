//! Schema registry for the reference document/object store.
//!
//! # Responsibility
//! - Own the SQL that creates the `documents` table (owner-partitioned JSON
//!   bodies keyed by `(owner_id, collection, id)`) and the `objects` table
//!   (uploaded blobs addressed by owner and uuid).
//! - Bring any older database up to `latest_version()` in one transaction.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order.
//! - After a successful apply, `PRAGMA user_version` equals the last applied
//!   step; a failed step leaves the previous version in place.
//! - Databases written by a newer build are refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;
use std::time::Instant;

/// One schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    /// Short label used in log lines.
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    SchemaStep {
        version: 2,
        name: "objects",
        sql: include_str!("0002_objects.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `SchemaStep` when a step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = pending_steps(from_version).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let started_at = Instant::now();
    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::SchemaStep {
                version: step.version,
                name: step.name,
                source,
            })?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={} duration_ms={}",
        from_version,
        latest,
        pending.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Schema version recorded in `PRAGMA user_version`; `0` for a fresh file.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn pending_steps(from_version: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS
        .iter()
        .filter(move |step| step.version > from_version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};

    #[test]
    fn steps_are_strictly_increasing() {
        assert!(SCHEMA_STEPS
            .windows(2)
            .all(|pair| pair[0].version < pair[1].version));
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        let names: Vec<&str> = pending_steps(1).map(|step| step.name).collect();
        assert_eq!(names, vec!["objects"]);
        assert_eq!(pending_steps(0).count(), SCHEMA_STEPS.len());
        assert_eq!(pending_steps(latest_version()).count(), 0);
    }
}
