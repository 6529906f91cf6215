//! Translation of generic queries and options into store filter documents.

use crate::{
    Order, Query,
    normalize::{KeyPolicy, NATIVE_ID, to_native_id},
};
use mongodb::bson::{Bson, Document, doc};

/// Builds the store filter for `query`.
///
/// Array values become `$in` filters; scalars stay equality filters. Values
/// of `_id` are converted to native identifiers when the table's pk is native.
pub fn prepare_query(query: &Query, policy: &KeyPolicy) -> Document {
    let mut filter = Document::new();

    for (field, value) in query.iter() {
        let value = if policy.is_native() && field == NATIVE_ID {
            to_native_id(value)
        } else {
            value.clone()
        };

        let value = match value {
            Bson::Array(values) => Bson::Document(doc! { "$in": values }),
            other => other,
        };

        filter.insert(field.clone(), value);
    }

    filter
}

pub fn sort_document(order_by: &[(String, Order)]) -> Option<Document> {
    if order_by.is_empty() {
        return None;
    }

    Some(
        order_by
            .iter()
            .map(|(field, order)| {
                let direction = match order {
                    Order::Asc => 1,
                    Order::Desc => -1,
                };
                (field.clone(), Bson::Int32(direction))
            })
            .collect(),
    )
}

pub fn projection_document<S: AsRef<str>>(fields: &[S]) -> Option<Document> {
    if fields.is_empty() {
        return None;
    }

    Some(
        fields
            .iter()
            .map(|field| (field.as_ref().to_owned(), Bson::Int32(1)))
            .collect(),
    )
}

/// Pipeline grouping documents by `fields`, counting the members of each group.
pub fn group_pipeline<S: AsRef<str>>(fields: &[S]) -> Vec<Document> {
    let by = fields
        .iter()
        .map(|field| {
            let field = field.as_ref();
            (field.to_owned(), Bson::String(format!("${field}")))
        })
        .collect::<Document>();

    vec![doc! {
        "$group": {
            "_id": by,
            "count": { "$sum": 1 },
        }
    }]
}

/// Wraps plain field data in `$set`; documents that already use update
/// operators are passed through.
pub fn update_document(data: Document) -> Document {
    if data.keys().any(|key| key.starts_with('$')) {
        data
    } else {
        doc! { "$set": data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use rstest::rstest;

    #[test]
    fn scalars_stay_equality_filters() {
        let query = Query::new().with("class", "NotExisting");

        assert_eq!(
            prepare_query(&query, &KeyPolicy::default()),
            doc! { "class": "NotExisting" }
        );
    }

    #[test]
    fn arrays_become_membership_filters() {
        let query = Query::new()
            .with("class", "NotExisting")
            .any_of("stage", ["not", "existing"]);

        assert_eq!(
            prepare_query(&query, &KeyPolicy::default()),
            doc! {
                "class": "NotExisting",
                "stage": { "$in": ["not", "existing"] },
            }
        );
    }

    #[test]
    fn operator_documents_pass_through() {
        let query = Query::from(doc! { "n": { "$gt": 3 } });

        assert_eq!(
            prepare_query(&query, &KeyPolicy::default()),
            doc! { "n": { "$gt": 3 } }
        );
    }

    #[test]
    fn caller_query_is_not_mutated() {
        let query = Query::new().any_of("stage", ["not"]);
        let before = query.clone();

        let _ = prepare_query(&query, &KeyPolicy::default());

        assert_eq!(query, before);
    }

    #[test]
    fn native_ids_are_converted_in_queries() {
        let a = ObjectId::new();
        let b = ObjectId::new();

        let single = Query::new().with("_id", a.to_hex());
        let many = Query::new().any_of("_id", [a.to_hex(), b.to_hex()]);

        assert_eq!(
            prepare_query(&single, &KeyPolicy::default()),
            doc! { "_id": a }
        );
        assert_eq!(
            prepare_query(&many, &KeyPolicy::default()),
            doc! { "_id": { "$in": [a, b] } }
        );
    }

    #[rstest]
    #[case("$eq")]
    #[case("$ne")]
    fn native_ids_are_converted_in_operator_filters(#[case] operator: &str) {
        let oid = ObjectId::new();
        let mut condition = Document::new();
        condition.insert(operator, oid.to_hex());

        let query = Query::from(doc! { "_id": condition });

        let mut expected = Document::new();
        expected.insert(operator, oid);
        assert_eq!(
            prepare_query(&query, &KeyPolicy::default()),
            doc! { "_id": expected }
        );
    }

    #[test]
    fn native_ids_are_converted_in_membership_operators() {
        let a = ObjectId::new();
        let b = ObjectId::new();

        let query = Query::from(doc! { "_id": { "$in": [a.to_hex()], "$nin": [b.to_hex()] } });

        assert_eq!(
            prepare_query(&query, &KeyPolicy::default()),
            doc! { "_id": { "$in": [a], "$nin": [b] } }
        );
    }

    #[test]
    fn ids_are_untouched_under_custom_pk() {
        let hex = ObjectId::new().to_hex();
        let query = Query::new().with("_id", hex.clone());

        assert_eq!(
            prepare_query(&query, &KeyPolicy::new("name", None)),
            doc! { "_id": hex }
        );
    }

    #[test]
    fn sort_preserves_order_and_direction() {
        let sort = sort_document(&[
            ("b".to_owned(), Order::Desc),
            ("a".to_owned(), Order::Asc),
        ])
        .unwrap();

        assert_eq!(sort, doc! { "b": -1, "a": 1 });
        assert_eq!(sort.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(sort_document(&[]).is_none());
    }

    #[test]
    fn projection_includes_listed_fields() {
        assert_eq!(
            projection_document(&["class".to_owned(), "stage".to_owned()]),
            Some(doc! { "class": 1, "stage": 1 })
        );
        assert!(projection_document::<&str>(&[]).is_none());
    }

    #[test]
    fn group_pipeline_references_fields() {
        assert_eq!(
            group_pipeline(&["class", "stage"]),
            vec![doc! {
                "$group": {
                    "_id": { "class": "$class", "stage": "$stage" },
                    "count": { "$sum": 1 },
                }
            }]
        );
    }

    #[test]
    fn plain_data_is_wrapped_in_set() {
        assert_eq!(
            update_document(doc! { "class": "B" }),
            doc! { "$set": { "class": "B" } }
        );
        assert_eq!(
            update_document(doc! { "$inc": { "n": 1 } }),
            doc! { "$inc": { "n": 1 } }
        );
    }
}
