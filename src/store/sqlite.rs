//! SQLite-backed document store.
//!
//! Every collection shares one `documents` table. Bodies are the JSON encoding
//! of the document; `name` is denormalized into its own indexed column for
//! [`Collection::find_by_name`]. Insertion order is the table's rowid order,
//! which an upsert preserves.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, error, info};

use super::{Collection, Document, Record, StoreError, StoreResult};
use crate::ids::DocumentId;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_documents.sql"),
}];

/// Latest schema version known by this binary.
#[must_use]
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let started = Instant::now();
        let mut conn = Connection::open(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to open database");
        })?;
        bootstrap(&mut conn)?;
        info!(
            path = %path.display(),
            schema_version = latest_schema_version(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Document store opened"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory database. Contents vanish with the store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        bootstrap(&mut conn)?;
        info!(
            schema_version = latest_schema_version(),
            "In-memory document store opened"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
        op(&conn)
    }
}

fn bootstrap(conn: &mut Connection) -> StoreResult<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
    apply_migrations(conn)
}

fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let latest = latest_schema_version();

    if current > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        debug!(version = migration.version, "Applied store migration");
    }
    tx.commit()?;
    Ok(())
}

fn decode<D: Document>(id: String, body: String) -> StoreResult<Record<D>> {
    let id = id
        .parse::<DocumentId>()
        .map_err(|_| StoreError::InvalidData(format!("malformed document id \"{id}\"")))?;
    let doc = serde_json::from_str::<D>(&body)?;
    Ok(Record { id, doc })
}

impl<D: Document> Collection<D> for SqliteStore {
    fn find_all(&self) -> StoreResult<Vec<Record<D>>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![D::COLLECTION], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut records = Vec::new();
            for row in rows {
                let (id, body) = row?;
                records.push(decode(id, body)?);
            }
            debug!(
                collection = D::COLLECTION,
                count = records.len(),
                "Loaded all documents"
            );
            Ok(records)
        })
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Record<D>>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare_cached(
                    "SELECT id, body FROM documents
                     WHERE collection = ?1 AND name = ?2
                     ORDER BY rowid LIMIT 1",
                )?
                .query_row(params![D::COLLECTION, name], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .optional()?;
            row.map(|(id, body)| decode(id, body)).transpose()
        })
    }

    fn save(&self, record: &Record<D>) -> StoreResult<()> {
        let body = serde_json::to_string(&record.doc)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (id, collection, name, body)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     body = excluded.body,
                     updated_at = strftime('%s', 'now')",
                params![
                    record.id.to_string(),
                    D::COLLECTION,
                    record.doc.name(),
                    body
                ],
            )?;
            debug!(
                collection = D::COLLECTION,
                id = %record.id,
                "Document saved"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cat, Dog};

    #[test]
    fn migrations_set_user_version() {
        let store = SqliteStore::open_in_memory().unwrap();
        let version: u32 = store
            .with_conn(|c| Ok(c.query_row("PRAGMA user_version", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(version, latest_schema_version());
    }

    #[test]
    fn save_then_find_by_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        let record = Record::new(Cat::new("Tom", 2));
        store.save(&record).unwrap();

        let found: Option<Record<Cat>> = store.find_by_name("Tom").unwrap();
        assert_eq!(found, Some(record));
        let missing: Option<Record<Cat>> = store.find_by_name("Jerry").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn save_twice_updates_in_place() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut record = Record::new(Cat::new("Tom", 2));
        store.save(&record).unwrap();
        record.doc.beds_owned = 3;
        store.save(&record).unwrap();

        let all: Vec<Record<Cat>> = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].doc.beds_owned, 3);
    }

    #[test]
    fn collections_are_isolated() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.save(&Record::new(Cat::new("Rex", 1))).unwrap();
        store.save(&Record::new(Dog::new("Rex", "Collie", 4))).unwrap();

        let cats: Vec<Record<Cat>> = store.find_all().unwrap();
        let dogs: Vec<Record<Dog>> = store.find_all().unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(dogs.len(), 1);
        let dog: Record<Dog> = store.find_by_name("Rex").unwrap().unwrap();
        assert_eq!(dog.doc.breed, "Collie");
    }

    #[test]
    fn find_by_name_returns_first_inserted() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = Record::new(Cat::new("Twin", 1));
        let second = Record::new(Cat::new("Twin", 5));
        store.save(&first).unwrap();
        store.save(&second).unwrap();
        // Re-saving the first keeps its original position.
        store.save(&first).unwrap();

        let found: Record<Cat> = store.find_by_name("Twin").unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }
}
