//! Reconciles the logical primary key of a table with the store's native `_id`.

use crate::{Error, Result};
use mongodb::bson::{Bson, Document, oid::ObjectId};

pub const NATIVE_ID: &str = "_id";

/// Which field identifies a record, and under which name the native
/// identifier is handed back to callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPolicy {
    pk: String,
    id_as: Option<String>,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(NATIVE_ID, None)
    }
}

impl KeyPolicy {
    pub fn new(pk: impl Into<String>, id_as: Option<String>) -> Self {
        Self {
            pk: pk.into(),
            id_as: id_as.filter(|alias| !alias.is_empty()),
        }
    }

    pub fn pk(&self) -> &str {
        &self.pk
    }

    pub fn id_as(&self) -> Option<&str> {
        self.id_as.as_deref()
    }

    pub fn is_native(&self) -> bool {
        self.pk == NATIVE_ID
    }

    /// Converts a record read from the store into its caller-facing shape.
    pub fn normalize_record(&self, mut record: Document) -> Document {
        if self.is_native() {
            if let Some(id) = record.get_mut(NATIVE_ID) {
                *id = Bson::String(id_to_string(id));
            }
        } else {
            record.remove(NATIVE_ID);
        }

        record
    }

    /// Filter selecting the single record identified by `record`'s pk.
    ///
    /// Under a native pk, records that only carry the `id_as` alias are
    /// matched through it.
    pub fn match_filter(&self, record: &Document) -> Result<Document> {
        let key = record
            .get(&self.pk)
            .or_else(|| {
                self.is_native()
                    .then(|| self.id_as().and_then(|alias| record.get(alias)))
                    .flatten()
            })
            .ok_or_else(|| Error::MissingKey {
                pk: self.pk.clone(),
            })?;

        let key = if self.is_native() {
            to_native_id(key)
        } else {
            key.clone()
        };

        let mut filter = Document::new();
        filter.insert(self.pk.clone(), key);
        Ok(filter)
    }

    /// Strips the immutable native identifier from an update payload.
    pub fn update_payload(&self, mut record: Document) -> Document {
        record.remove(NATIVE_ID);
        record
    }

    /// Prepares a record for insertion. A null `_id` is dropped so the store
    /// generates one.
    pub fn insert_payload(&self, mut record: Document) -> Document {
        if matches!(record.get(NATIVE_ID), Some(Bson::Null)) {
            record.remove(NATIVE_ID);
        }

        if self.is_native() {
            if let Some(id) = record.get_mut(NATIVE_ID) {
                *id = to_native_id(id);
            }
        }

        record
    }

    /// Field the generated identifier is exposed under after an insert.
    pub fn inserted_id_field(&self) -> &str {
        self.id_as().unwrap_or(NATIVE_ID)
    }

    /// Whether the alias must also be written back to the stored document.
    pub fn persists_alias(&self) -> bool {
        self.id_as().is_some_and(|alias| alias != NATIVE_ID)
    }
}

/// Canonical string form of a native identifier.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(string) => string.clone(),
        Bson::Int32(int) => int.to_string(),
        Bson::Int64(int) => int.to_string(),
        other => other.to_string(),
    }
}

/// Converts a caller-side identifier into the store's native type.
///
/// Hex strings become object ids, also inside arrays and operator documents
/// such as `{"$in": [...]}`. Anything else is left alone, so tables that
/// store their own string or numeric `_id`s keep working.
pub fn to_native_id(id: &Bson) -> Bson {
    match id {
        Bson::String(string) => match ObjectId::parse_str(string) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => id.clone(),
        },
        Bson::Array(values) => Bson::Array(values.iter().map(to_native_id).collect()),
        Bson::Document(operators)
            if !operators.is_empty() && operators.keys().all(|key| key.starts_with('$')) =>
        {
            Bson::Document(
                operators
                    .iter()
                    .map(|(operator, operand)| (operator.clone(), to_native_id(operand)))
                    .collect(),
            )
        }
        other => other.clone(),
    }
}
