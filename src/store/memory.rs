use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, warn};

use super::{Collection, Document, Record, StoreError, StoreResult};
use crate::ids::DocumentId;

/// In-memory document store.
///
/// Keeps each collection as an insertion-ordered list of JSON bodies, so it
/// exercises the same encode/decode path as [`super::SqliteStore`]. Reads and
/// writes can be switched to fail, which is how tests drive the 500 paths.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Vec<(DocumentId, Value)>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `find_all` / `find_by_name` fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of documents stored in `collection`.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            warn!(operation = op, "Simulated store failure");
            return Err(StoreError::Unavailable(format!("simulated {op} failure")));
        }
        Ok(())
    }

    fn with_collections<T>(
        &self,
        op: impl FnOnce(&mut HashMap<&'static str, Vec<(DocumentId, Value)>>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("collection lock poisoned".to_string()))?;
        op(&mut guard)
    }
}

fn decode<D: Document>(id: DocumentId, body: &Value) -> StoreResult<Record<D>> {
    Ok(Record {
        id,
        doc: serde_json::from_value(body.clone())?,
    })
}

impl<D: Document> Collection<D> for MemoryStore {
    fn find_all(&self) -> StoreResult<Vec<Record<D>>> {
        self.check(&self.fail_reads, "read")?;
        self.with_collections(|collections| {
            collections
                .get(D::COLLECTION)
                .map(|docs| docs.iter().map(|(id, body)| decode(*id, body)).collect())
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Record<D>>> {
        self.check(&self.fail_reads, "read")?;
        self.with_collections(|collections| {
            let Some(docs) = collections.get(D::COLLECTION) else {
                return Ok(None);
            };
            docs.iter()
                .find(|(_, body)| body.get("name").and_then(Value::as_str) == Some(name))
                .map(|(id, body)| decode(*id, body))
                .transpose()
        })
    }

    fn save(&self, record: &Record<D>) -> StoreResult<()> {
        self.check(&self.fail_writes, "write")?;
        let body = serde_json::to_value(&record.doc)?;
        self.with_collections(|collections| {
            let docs = collections.entry(D::COLLECTION).or_default();
            match docs.iter_mut().find(|(id, _)| *id == record.id) {
                Some(slot) => slot.1 = body,
                None => docs.push((record.id, body)),
            }
            debug!(collection = D::COLLECTION, id = %record.id, "Document saved");
            Ok(())
        })
    }
}
