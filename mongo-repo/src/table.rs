use crate::{
    Error, FindOptions, Query, Record, Result,
    normalize::{KeyPolicy, NATIVE_ID, id_to_string},
    store::{DocumentStore, FindSpec},
    translate::{group_pipeline, prepare_query, projection_document, sort_document, update_document},
};
use mongodb::bson::{self, Document, doc};
use std::{fmt::Display, marker::PhantomData, sync::Arc};
use tracing::{debug, warn};

/// Aggregation state left on a table by [`Table::group`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grouping {
    pub fields: Vec<String>,
    pub pipeline: Vec<Document>,
    pub groups: Vec<Document>,
}

/// A repository view over one store collection.
///
/// Records of type `T` are serialized to documents on the way in and rebuilt
/// from normalized documents on the way out, see [`KeyPolicy`].
pub struct Table<T = Document> {
    name: String,
    store: Arc<dyn DocumentStore>,
    policy: KeyPolicy,
    grouping: Option<Grouping>,
    record: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("grouping", &self.grouping)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
            grouping: self.grouping.clone(),
            record: PhantomData,
        }
    }
}

impl<T: Record> Table<T> {
    pub fn new(name: impl Into<String>, store: Arc<dyn DocumentStore>, policy: KeyPolicy) -> Self {
        Self {
            name: name.into(),
            store,
            policy,
            grouping: None,
            record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_policy(&self) -> &KeyPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Reinterprets the records of this table as another type.
    pub fn typed<U: Record>(&self) -> Table<U> {
        Table {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
            grouping: self.grouping.clone(),
            record: PhantomData,
        }
    }

    fn materialize(&self, record: Document) -> Result<T> {
        Ok(bson::from_document(self.policy.normalize_record(record))?)
    }

    pub async fn find_one(&self, query: &Query, offset: u64, fields: &[&str]) -> Result<Option<T>> {
        let filter = prepare_query(query, &self.policy);
        let spec = FindSpec {
            skip: offset,
            projection: projection_document(fields),
            ..FindSpec::default()
        };

        let record = self.store.find_one(filter, spec).await?;

        record.map(|record| self.materialize(record)).transpose()
    }

    pub async fn one(&self, query: &Query) -> Result<Option<T>> {
        self.find_one(query, 0, &[]).await
    }

    pub async fn find_all(&self, query: &Query, options: &FindOptions) -> Result<Vec<T>> {
        let filter = prepare_query(query, &self.policy);
        let spec = FindSpec {
            skip: options.offset,
            limit: options.limit,
            sort: sort_document(&options.order_by),
            projection: projection_document(&options.fields),
        };

        let records = self.store.find(filter, spec).await?;

        records
            .into_iter()
            .map(|record| self.materialize(record))
            .collect()
    }

    pub async fn all(&self, query: &Query) -> Result<Vec<T>> {
        self.find_all(query, &FindOptions::default()).await
    }

    /// Inserts `item` and returns it as callers should see it from now on.
    ///
    /// Under a native pk the generated identifier is copied into the item,
    /// under `id_as` when one is configured.
    pub async fn insert(&self, item: T) -> Result<T> {
        let document = self.policy.insert_payload(bson::to_document(&item)?);

        let Some(id) = self.store.insert_one(document.clone()).await? else {
            warn!(table = %self.name, "store reported no inserted record");
            return Err(Error::NotInserted {
                table: self.name.clone(),
            });
        };

        if !self.policy.is_native() {
            return Ok(item);
        }

        let key = id_to_string(&id);
        let field = self.policy.inserted_id_field().to_owned();

        let mut inserted = self.policy.normalize_record(document);
        inserted.insert(field.clone(), key.clone());

        if self.policy.persists_alias() {
            debug!(table = %self.name, alias = %field, "persisting identifier alias");
            self.store
                .update_one(doc! { NATIVE_ID: id }, doc! { "$set": { field: key } })
                .await?;
        }

        Ok(bson::from_document(inserted)?)
    }

    /// Replaces the stored record sharing `item`'s pk with `item`, keeping
    /// its native identifier. Returns whether a record was modified.
    pub async fn update(&self, item: &T) -> Result<bool> {
        let document = bson::to_document(item)?;
        let filter = self.policy.match_filter(&document)?;
        let replacement = self.policy.update_payload(document);

        let outcome = self.store.replace_one(filter, replacement).await?;

        Ok(outcome.succeeded())
    }

    /// Applies `data` to every record matching `query`. Returns the number of
    /// modified records.
    pub async fn update_many(&self, query: &Query, data: Document) -> Result<u64> {
        let filter = prepare_query(query, &self.policy);
        let update = update_document(self.policy.update_payload(data));

        let outcome = self.store.update_many(filter, update).await?;

        Ok(outcome.affected())
    }

    /// Deletes the stored record sharing `item`'s pk. Returns whether it
    /// existed.
    pub async fn delete(&self, item: &T) -> Result<bool> {
        let filter = self.policy.match_filter(&bson::to_document(item)?)?;

        let outcome = self.store.delete_one(filter).await?;

        Ok(outcome.succeeded())
    }

    pub async fn delete_many(&self, query: &Query) -> Result<u64> {
        let filter = prepare_query(query, &self.policy);

        let outcome = self.store.delete_many(filter).await?;

        Ok(outcome.affected())
    }

    pub async fn drop(&self) -> Result<bool> {
        self.store.drop_collection().await?;

        Ok(true)
    }

    /// Groups the table's records by `fields`, keeping the result as this
    /// table's pending aggregation state.
    pub async fn group<F: Display>(
        &mut self,
        fields: impl IntoIterator<Item = F>,
    ) -> Result<&mut Self> {
        let fields = fields
            .into_iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>();
        let pipeline = group_pipeline(&fields);

        let groups = self.store.aggregate(pipeline.clone()).await?;

        self.grouping = Some(Grouping {
            fields,
            pipeline,
            groups,
        });

        Ok(self)
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
    }
}

