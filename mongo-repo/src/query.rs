use mongodb::bson::{Bson, Document};
use std::fmt::Display;

/// A generic field → value query.
///
/// Scalar values match by equality. Array values match documents whose field
/// is a member of the array, see [`prepare_query`](crate::translate::prepare_query).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query(Document);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any previous value for `field`.
    pub fn with(mut self, field: impl Display, value: impl Into<Bson>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// Adds a set-membership entry.
    pub fn any_of<V: Into<Bson>>(
        self,
        field: impl Display,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect::<Vec<Bson>>();
        self.with(field, values)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bson)> {
        self.0.iter()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Query {
    fn from(value: Document) -> Self {
        Self(value)
    }
}

impl From<Query> for Document {
    fn from(value: Query) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// Pagination, ordering and projection for [`Table::find_all`](crate::Table::find_all).
///
/// Zero `limit` and `offset` mean "unbounded" and "no skip"; empty `fields`
/// returns every field.
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub limit: u64,
    pub offset: u64,
    pub order_by: Vec<(String, Order)>,
    pub fields: Vec<String>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn order_by(mut self, field: impl Display, order: Order) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    pub fn fields<F: Display>(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.fields = fields.into_iter().map(|field| field.to_string()).collect();
        self
    }
}
