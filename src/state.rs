//! The last-added cat.
//!
//! Reads are lock-free through [`ArcSwap`]. Writers go through a coroutine-aware
//! mutex held across the whole read-modify-persist-swap sequence, so two
//! concurrent writers are applied one after the other and the slot only ever
//! advances to a record whose save succeeded.

use std::sync::Arc;

use arc_swap::ArcSwap;
use may::sync::Mutex;
use tracing::debug;

use crate::model::Cat;
use crate::store::Record;

pub struct LastAdded {
    slot: ArcSwap<Record<Cat>>,
    writer: Mutex<()>,
}

impl Default for LastAdded {
    fn default() -> Self {
        Self::new(Record::new(Cat::placeholder()))
    }
}

impl LastAdded {
    #[must_use]
    pub fn new(initial: Record<Cat>) -> Self {
        Self {
            slot: ArcSwap::from_pointee(initial),
            writer: Mutex::new(()),
        }
    }

    /// Snapshot of the current record.
    #[must_use]
    pub fn current(&self) -> Arc<Record<Cat>> {
        self.slot.load_full()
    }

    /// Persist `record` with `persist` and, only if that succeeds, make it the
    /// last-added record.
    pub fn replace_with<E>(
        &self,
        record: Record<Cat>,
        persist: impl FnOnce(&Record<Cat>) -> Result<(), E>,
    ) -> Result<Arc<Record<Cat>>, E> {
        let _guard = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        persist(&record)?;
        let record = Arc::new(record);
        self.slot.store(Arc::clone(&record));
        debug!(id = %record.id, name = %record.doc.name, "Last-added cat replaced");
        Ok(record)
    }

    /// Derive a new version of the current record with `change`, persist it,
    /// and swap it in on success. If either step fails the slot is left untouched.
    pub fn update_with<E>(
        &self,
        change: impl FnOnce(&mut Cat) -> Result<(), E>,
        persist: impl FnOnce(&Record<Cat>) -> Result<(), E>,
    ) -> Result<Arc<Record<Cat>>, E> {
        let _guard = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = Record::clone(&self.slot.load());
        change(&mut next.doc)?;
        persist(&next)?;
        let next = Arc::new(next);
        self.slot.store(Arc::clone(&next));
        debug!(id = %next.id, beds = next.doc.beds_owned, "Last-added cat updated");
        Ok(next)
    }
}
