use super::{DocumentStore, FindSpec};
use crate::{Error, Result, WriteOutcome, normalize::NATIVE_ID};
use futures_util::{FutureExt, future::BoxFuture};
use mongodb::bson::{Bson, Document, oid::ObjectId};
use parking_lot::RwLock;
use std::cmp::Ordering;
use tracing::debug;

/// An in-process collection understanding the filters, updates and pipelines
/// tables produce: equality with array membership, `$eq`/`$ne`/`$in`/`$nin`,
/// `$set`/`$unset` or whole-document replacement, and `$match`, `$group`
/// (with `$sum`), `$sort`, `$skip`, `$limit` stages.
///
/// Single-record writes only acknowledge whether anything changed, the way
/// older drivers did; multi-record writes report counts.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, filter: &Document, spec: &FindSpec) -> Result<Vec<Document>> {
        let documents = self.documents.read();

        let mut selected = Vec::new();
        for document in documents.iter() {
            if matches(document, filter)? {
                selected.push(document);
            }
        }

        if let Some(sort) = &spec.sort {
            selected.sort_by(|a, b| compare_by(a, b, sort));
        }

        let skip = usize::try_from(spec.skip).unwrap_or(usize::MAX);
        let limit = match spec.limit {
            0 => usize::MAX,
            limit => usize::try_from(limit).unwrap_or(usize::MAX),
        };

        Ok(selected
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| project(document, spec.projection.as_ref()))
            .collect())
    }

    fn update(&self, filter: &Document, update: &Document, many: bool) -> Result<u64> {
        let mut documents = self.documents.write();
        let mut modified = 0;

        for document in documents.iter_mut() {
            if !matches(document, filter)? {
                continue;
            }

            let updated = apply_update(document, update)?;
            if updated != *document {
                *document = updated;
                modified += 1;
            }

            if !many {
                break;
            }
        }

        Ok(modified)
    }

    fn delete(&self, filter: &Document, many: bool) -> Result<u64> {
        let mut documents = self.documents.write();
        let mut doomed = Vec::new();

        for (index, document) in documents.iter().enumerate() {
            if matches(document, filter)? {
                doomed.push(index);
                if !many {
                    break;
                }
            }
        }

        for index in doomed.iter().rev() {
            documents.remove(*index);
        }

        Ok(doomed.len() as u64)
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn find_one(
        &self,
        filter: Document,
        spec: FindSpec,
    ) -> BoxFuture<'_, Result<Option<Document>>> {
        async move {
            debug!(table = self.name(), %filter, skip = spec.skip, "find_one");

            let spec = FindSpec { limit: 1, ..spec };
            Ok(self.select(&filter, &spec)?.into_iter().next())
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

            self.select(&filter, &spec)
        }
        .boxed()
    }

    fn insert_one(&self, document: Document) -> BoxFuture<'_, Result<Option<Bson>>> {
        async move {
            debug!(table = self.name(), "insert_one");

            let id = document
                .get(NATIVE_ID)
                .cloned()
                .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));

            let mut documents = self.documents.write();

            if documents
                .iter()
                .any(|stored| stored.get(NATIVE_ID).is_some_and(|key| equals(key, &id)))
            {
                return Err(Error::DuplicateKey { key: id.to_string() });
            }

            let mut stored = Document::new();
            stored.insert(NATIVE_ID, id.clone());
            for (key, value) in document {
                if key != NATIVE_ID {
                    stored.insert(key, value);
                }
            }
            documents.push(stored);

            Ok(Some(id))
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

            let modified = self.update(&filter, &update, false)?;

            Ok(WriteOutcome::Acknowledged(modified > 0))
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

            if let Some(operator) = replacement.keys().find(|key| key.starts_with('$')) {
                return Err(unsupported(operator));
            }

            let modified = self.update(&filter, &replacement, false)?;

            Ok(WriteOutcome::Acknowledged(modified > 0))
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

            let modified = self.update(&filter, &update, true)?;

            Ok(WriteOutcome::Affected(modified))
        }
        .boxed()
    }

    fn delete_one(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "delete_one");

            let deleted = self.delete(&filter, false)?;

            Ok(WriteOutcome::Acknowledged(deleted > 0))
        }
        .boxed()
    }

    fn delete_many(&self, filter: Document) -> BoxFuture<'_, Result<WriteOutcome>> {
        async move {
            debug!(table = self.name(), %filter, "delete_many");

            let deleted = self.delete(&filter, true)?;

            Ok(WriteOutcome::Affected(deleted))
        }
        .boxed()
    }

    fn drop_collection(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            debug!(table = self.name(), "drop");

            self.documents.write().clear();

            Ok(())
        }
        .boxed()
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> BoxFuture<'_, Result<Vec<Document>>> {
        async move {
            debug!(table = self.name(), stages = pipeline.len(), "aggregate");

            let mut documents = self.documents.read().clone();

            for stage in &pipeline {
                documents = run_stage(documents, stage)?;
            }

            Ok(documents)
        }
        .boxed()
    }
}

fn unsupported(operator: &str) -> Error {
    Error::UnsupportedOperator {
        operator: operator.to_owned(),
    }
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }

    Some(current)
}

fn operator_document(value: &Bson) -> Option<&Document> {
    match value {
        Bson::Document(document)
            if document.keys().next().is_some_and(|key| key.starts_with('$')) =>
        {
            Some(document)
        }
        _ => None,
    }
}

fn matches(document: &Document, filter: &Document) -> Result<bool> {
    for (path, condition) in filter {
        if path.starts_with('$') {
            return Err(unsupported(path));
        }

        let value = lookup(document, path);
        let matched = match operator_document(condition) {
            Some(operators) => matches_operators(value, operators)?,
            None => matches_value(value, condition),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Equality with MongoDB semantics: an array field matches when it equals the
/// candidate or contains it, and a missing field matches `null`.
fn matches_value(value: Option<&Bson>, candidate: &Bson) -> bool {
    match value {
        None => matches!(candidate, Bson::Null),
        Some(value @ Bson::Array(items)) => {
            equals(value, candidate) || items.iter().any(|item| equals(item, candidate))
        }
        Some(value) => equals(value, candidate),
    }
}

fn matches_operators(value: Option<&Bson>, operators: &Document) -> Result<bool> {
    for (operator, operand) in operators {
        let matched = match operator.as_str() {
            "$eq" => matches_value(value, operand),
            "$ne" => !matches_value(value, operand),
            "$in" | "$nin" => {
                let Bson::Array(candidates) = operand else {
                    return Err(unsupported(operator));
                };
                let member = candidates
                    .iter()
                    .any(|candidate| matches_value(value, candidate));
                member == (operator == "$in")
            }
            other => return Err(unsupported(other)),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(value) => Some(f64::from(*value)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(value) => Some(*value as f64),
        Bson::Double(value) => Some(*value),
        _ => None,
    }
}

/// Numbers compare by value across integer widths; other values only equal
/// themselves.
fn equals(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(a), Some(b)) => a.total_cmp(&b) == Ordering::Equal,
        _ => a == b,
    }
}

/// Sort order within a field. Missing values and nulls come first, then
/// numbers, then strings; other types keep their insertion order.
fn compare(a: &Bson, b: &Bson) -> Ordering {
    fn bracket(value: &Bson) -> u8 {
        match value {
            Bson::Null => 0,
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
            Bson::String(_) => 2,
            _ => 3,
        }
    }

    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => a.cmp(b),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => bracket(a).cmp(&bracket(b)),
        },
    }
}

fn compare_by(a: &Document, b: &Document, sort: &Document) -> Ordering {
    for (field, direction) in sort {
        let a_value = lookup(a, field).unwrap_or(&Bson::Null);
        let b_value = lookup(b, field).unwrap_or(&Bson::Null);

        let ordering = compare(a_value, b_value);
        let ordering = if as_f64(direction).is_some_and(|direction| direction < 0.0) {
            ordering.reverse()
        } else {
            ordering
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Inclusion projection over top-level fields; `_id` stays unless excluded.
fn project(document: &Document, projection: Option<&Document>) -> Document {
    let Some(projection) = projection else {
        return document.clone();
    };

    let keep_id = projection.get(NATIVE_ID).is_none_or(|flag| match flag {
        Bson::Boolean(flag) => *flag,
        other => as_f64(other).is_none_or(|flag| flag != 0.0),
    });

    document
        .iter()
        .filter(|(field, _)| {
            if *field == NATIVE_ID {
                keep_id
            } else {
                projection.contains_key(field.as_str())
            }
        })
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}

fn apply_update(document: &Document, update: &Document) -> Result<Document> {
    if !update.keys().any(|key| key.starts_with('$')) {
        let mut replaced = Document::new();
        if let Some(id) = document.get(NATIVE_ID) {
            replaced.insert(NATIVE_ID, id.clone());
        }
        for (key, value) in update {
            if key != NATIVE_ID {
                replaced.insert(key.clone(), value.clone());
            }
        }
        return Ok(replaced);
    }

    let mut updated = document.clone();

    for (operator, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(unsupported(operator));
        };

        match operator.as_str() {
            "$set" => {
                for (field, value) in fields {
                    updated.insert(field.clone(), value.clone());
                }
            }
            "$unset" => {
                for field in fields.keys() {
                    updated.remove(field);
                }
            }
            other => return Err(unsupported(other)),
        }
    }

    Ok(updated)
}

/// Stage argument of `$skip`/`$limit`: a non-negative whole number.
fn count(stage: &str, argument: &Bson) -> Result<usize> {
    let count = match argument {
        Bson::Int32(count) => i64::from(*count),
        Bson::Int64(count) => *count,
        #[allow(clippy::cast_possible_truncation)]
        Bson::Double(count) if count.is_finite() && count.fract() == 0.0 => *count as i64,
        _ => return Err(unsupported(stage)),
    };

    usize::try_from(count).map_err(|_| unsupported(stage))
}

fn run_stage(documents: Vec<Document>, stage: &Document) -> Result<Vec<Document>> {
    let Some((name, argument)) = stage.iter().next() else {
        return Ok(documents);
    };

    match (name.as_str(), argument) {
        ("$match", Bson::Document(filter)) => {
            let mut matched = Vec::new();
            for document in documents {
                if matches(&document, filter)? {
                    matched.push(document);
                }
            }
            Ok(matched)
        }
        ("$sort", Bson::Document(sort)) => {
            let mut sorted = documents;
            sorted.sort_by(|a, b| compare_by(a, b, sort));
            Ok(sorted)
        }
        ("$skip", argument) => Ok(documents.into_iter().skip(count(name, argument)?).collect()),
        ("$limit", argument) => Ok(documents.into_iter().take(count(name, argument)?).collect()),
        ("$group", Bson::Document(spec)) => group(documents, spec),
        _ => Err(unsupported(name)),
    }
}

/// Resolves `"$field"` references, recursing into documents.
fn evaluate(document: &Document, expression: &Bson) -> Bson {
    match expression {
        Bson::String(reference) if reference.starts_with('$') => {
            lookup(document, &reference[1..]).cloned().unwrap_or(Bson::Null)
        }
        Bson::Document(fields) => Bson::Document(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), evaluate(document, value)))
                .collect(),
        ),
        literal => literal.clone(),
    }
}

fn sum(a: &Bson, b: &Bson) -> Bson {
    match (a, b) {
        (Bson::Int32(a), Bson::Int32(b)) => a
            .checked_add(*b)
            .map_or_else(|| Bson::Int64(i64::from(*a) + i64::from(*b)), Bson::Int32),
        (Bson::Int32(a), Bson::Int64(b)) | (Bson::Int64(b), Bson::Int32(a)) => {
            Bson::Int64(i64::from(*a).saturating_add(*b))
        }
        (Bson::Int64(a), Bson::Int64(b)) => Bson::Int64(a.saturating_add(*b)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => Bson::Double(a + b),
            _ => a.clone(),
        },
    }
}

fn group(documents: Vec<Document>, spec: &Document) -> Result<Vec<Document>> {
    let key_expression = spec.get(NATIVE_ID).cloned().unwrap_or(Bson::Null);
    let mut groups: Vec<Document> = Vec::new();

    for document in &documents {
        let key = evaluate(document, &key_expression);

        let index = match groups
            .iter()
            .position(|group| group.get(NATIVE_ID).is_some_and(|existing| equals(existing, &key)))
        {
            Some(index) => index,
            None => {
                let mut accumulated = Document::new();
                accumulated.insert(NATIVE_ID, key);
                groups.push(accumulated);
                groups.len() - 1
            }
        };
        let accumulated = &mut groups[index];

        for (field, accumulator) in spec.iter().filter(|(field, _)| *field != NATIVE_ID) {
            let Some(operators) = operator_document(accumulator) else {
                return Err(unsupported(field));
            };

            for (operator, expression) in operators {
                if operator != "$sum" {
                    return Err(unsupported(operator));
                }

                let value = evaluate(document, expression);
                let total = accumulated.get(field).cloned().unwrap_or(Bson::Int32(0));
                accumulated.insert(field.clone(), sum(&total, &value));
            }
        }
    }

    Ok(groups)
}
