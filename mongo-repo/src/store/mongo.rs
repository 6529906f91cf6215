use super::{DocumentStore, FindSpec};
use crate::{Result, WriteOutcome};
use futures_util::{FutureExt, TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection,
    bson::{Bson, Document},
    options::{FindOneOptions, FindOptions},
};
use tracing::debug;

/// A store backed by a MongoDB server through the official driver.
#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

impl DocumentStore for MongoStore {
    fn name(&self) -> &str {
        self.collection.name()
    }

    fn find_one(
        &self,
        filter: Document,
        spec: FindSpec,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        async move {
            debug!(table = self.name(), %filter, skip = spec.skip, "find_one");

            let mut options = FindOneOptions::default();
            options.skip = (spec.skip > 0).then_some(spec.skip);
            options.sort = spec.sort;
            options.projection = spec.projection;

            let record = self.collection.find_one(filter).with_options(options).await?;

            Ok(record)
        }
        .boxed()
    }

    fn find(&self, filter: Document, spec: FindSpec) -> BoxFuture<'_, Result<Vec<Document>>> {
        async move {
            debug!(
                table = self.name(),
                %filter,
                skip = spec.skip,
                limit = spec.limit,
                "find"
            );

            let mut options = FindOptions::default();
            options.skip = (spec.skip > 0).then_some(spec.skip);
            options.limit =
                (spec.limit > 0).then(|| i64::try_from(spec.limit).unwrap_or(i64::MAX));
            options.sort = spec.sort;
            options.projection = spec.projection;

            let records = self
                .collection
                .find(filter)
                .with_options(options)
                .await?
                .try_collect::<Vec<_>>()
                .await?;

            Ok(records)
        }
        .boxed()
    }

    fn insert_one(&self, document: Document) -> BoxFuture<'_, Result<Option<Bson>>> {
        async move {
            debug!(table = self.name(), "insert_one");

            let result = self.collection.insert_one(document).await?;

            Ok(Some(result.inserted_id))
        }
        .boxed()
    }

    fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "update_one");

            let result = self.collection.update_one(filter, update).await?;

            Ok(WriteOutcome::Affected(result.modified_count))
        }
        .boxed()
    }

    fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "replace_one");

            let result = self.collection.replace_one(filter, replacement).await?;

            Ok(WriteOutcome::Affected(result.modified_count))
        }
        .boxed()
    }

    fn update_many(
        &self,
        filter: Document,
        update: Document,
    ) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "update_many");

            let result = self.collection.update_many(filter, update).await?;

            Ok(WriteOutcome::Affected(result.modified_count))
        }
        .boxed()
    }

    fn delete_one(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "delete_one");

            let result = self.collection.delete_one(filter).await?;

            Ok(WriteOutcome::Affected(result.deleted_count))
        }
        .boxed()
    }

    fn delete_many(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "delete_many");

            let result = self.collection.delete_many(filter).await?;

            Ok(WriteOutcome::Affected(result.deleted_count))
        }
        .boxed()
    }

    fn drop_collection(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            debug!(table = self.name(), "drop");

            self.collection.drop().await?;

            Ok(())
        }
        .boxed()
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> BoxFuture<'_, Result<Vec<Document>>> {
        async move {
            debug!(table = self.name(), stages = pipeline.len(), "aggregate");

            let documents = self
                .collection
                .aggregate(pipeline)
                .await?
                .try_collect::<Vec<_>>()
                .await?;

            Ok(documents)
        }
        .boxed()
    }
}
