//! Backends a [`Table`](crate::Table) can run against.

use crate::{Result, WriteOutcome};
use futures_util::future::BoxFuture;
use mongodb::bson::{Bson, Document};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Store-level read options, already translated from
/// [`FindOptions`](crate::FindOptions).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindSpec {
    /// Zero means no skip.
    pub skip: u64,
    /// Zero means unbounded.
    pub limit: u64,
    pub sort: Option<Document>,
    pub projection: Option<Document>,
}

/// A collection of documents in a MongoDB-compatible store.
///
/// Filters and updates are driver-native documents; translation from generic
/// queries happens before they get here.
pub trait DocumentStore: Send + Sync {
    fn name(&self) -> &str;

    fn find_one(&self, filter: Document, spec: FindSpec)
    -> BoxFuture<'_, Result<Option<Document>>>;

    fn find(&self, filter: Document, spec: FindSpec) -> BoxFuture<'_, Result<Vec<Document>>>;

    /// Returns the id of the inserted document, or `None` when nothing was
    /// inserted.
    fn insert_one(&self, document: Document) -> BoxFuture<'_, Result<Option<Bson>>>;

    fn update_one(&self, filter: Document, update: Document)
    -> BoxFuture<'_, Result<WriteOutcome>>;

    /// Replaces the whole matching document, keeping its `_id`.
    fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> BoxFuture<'_, Result<WriteOutcome>>;

    fn update_many(
        &self,
        filter: Document,
        update: Document,
    ) -> BoxFuture<'_, Result<WriteOutcome>>;

    fn delete_one(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>>;

    fn delete_many(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>>;

    fn drop_collection(&self) -> BoxFuture<'_, Result<()>>;

    fn aggregate(&self, pipeline: Vec<Document>) -> BoxFuture<'_, Result<Vec<Document>>>;
}

impl std::fmt::Debug for dyn DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
