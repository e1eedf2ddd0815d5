//! # Store Module
//!
//! The persistence gateway consumed by the request handlers. Documents are
//! grouped in named collections and addressed by a [`DocumentId`] assigned when
//! the record is built.
//!
//! Every collection offers the same three operations:
//!
//! - [`Collection::find_all`] - every record in insertion order, unbounded
//! - [`Collection::find_by_name`] - first record whose `name` matches exactly
//! - [`Collection::save`] - upsert keyed on the record's `_id`
//!
//! Two backends implement [`Collection`] for every [`Document`] type:
//!
//! - [`SqliteStore`] - JSON documents in a single SQLite table (file or memory)
//! - [`MemoryStore`] - ordered in-memory collections with fault injection
//!
//! Numeric fields arriving from HTTP bodies go through [`cast_integer`], which
//! accepts the same inputs an object-document mapper would coerce.

mod cast;
mod error;
mod memory;
mod sqlite;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

pub use cast::cast_integer;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::{latest_schema_version, SqliteStore};

/// A type that can be persisted in a named collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the documents of this type live in.
    const COLLECTION: &'static str;

    /// Value matched by [`Collection::find_by_name`].
    fn name(&self) -> &str;
}

/// A document together with its identity.
///
/// Serializes flat, the way the raw record is exposed over HTTP:
/// `{"_id": "...", "name": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<D> {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub doc: D,
}

impl<D: Document> Record<D> {
    /// Wrap a document with a freshly generated id. Nothing is persisted yet.
    pub fn new(doc: D) -> Self {
        Self {
            id: DocumentId::new(),
            doc,
        }
    }
}

/// Persistence operations over one document type.
pub trait Collection<D: Document>: Send + Sync {
    fn find_all(&self) -> StoreResult<Vec<Record<D>>>;
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Record<D>>>;
    fn save(&self, record: &Record<D>) -> StoreResult<()>;
}

/// Shared handle to a collection, as held by the handler context.
pub type SharedCollection<D> = Arc<dyn Collection<D>>;
