mod common;

use common::{init_tracing, options};
use mongo_repo::{FindOptions, Item, Order, Registry};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Item)]
#[item(table = "plugins", pk = "name")]
struct Plugin {
    name: String,
    #[serde(rename = "type")]
    class: String,
    stage: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Item)]
#[item(id_as = "id")]
struct AccountItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    owner: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Item)]
#[item(table = "notes")]
struct Note {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default, rename = "text", skip_serializing_if = "String::is_empty")]
    body: String,
    #[serde(rename(serialize = "tag_out", deserialize = "tag_in"), default)]
    tag: Option<String>,
}

fn not_existing() -> Plugin {
    Plugin {
        name: "p".into(),
        class: "NotExisting".into(),
        stage: vec!["not".into(), "existing".into()],
    }
}

#[test]
fn derive_reads_item_attributes() {
    assert_eq!(Plugin::TABLE_NAME, "plugins");
    assert_eq!(Plugin::PK, "name");
    assert_eq!(Plugin::ID_AS, None);

    assert_eq!(AccountItem::TABLE_NAME, "account");
    assert_eq!(AccountItem::PK, "_id");
    assert_eq!(AccountItem::ID_AS, Some("id"));
}

#[test]
fn fields_display_stored_names() {
    assert_eq!(plugin::Fields::Name.to_string(), "name");
    assert_eq!(plugin::Fields::Class.to_string(), "type");
    assert_eq!(String::from(plugin::Fields::Stage), "stage");
}

#[test]
fn renames_are_read_among_other_serde_keys() {
    assert_eq!(note::Fields::Id.to_string(), "_id");
    assert_eq!(note::Fields::Body.to_string(), "text");
    assert_eq!(note::Fields::Tag.to_string(), "tag");
}

#[test]
fn query_macro_builds_generic_queries() {
    let values = vec!["a".to_owned(), "b".to_owned()];

    let query = plugin::query! {
        class: "NotExisting",
        stage: AnyOf(values),
    };

    assert_eq!(
        query.as_document(),
        &mongo_repo::mongodb::bson::doc! { "type": "NotExisting", "stage": ["a", "b"] }
    );
}

#[test]
fn patch_macro_builds_documents() {
    let patch = plugin::patch! { class: "Existing", stage: ["x"] };

    assert_eq!(
        patch,
        mongo_repo::mongodb::bson::doc! { "type": "Existing", "stage": ["x"] }
    );
}

#[tokio::test]
async fn typed_tables_round_trip_items() {
    init_tracing();

    let registry = Registry::memory();
    let plugins = registry.driver(options()).table_for::<Plugin>().await.unwrap();

    let inserted = plugins.insert(not_existing()).await.unwrap();
    assert_eq!(inserted, not_existing());

    let found = plugins
        .one(&plugin::query! { stage: ["not"] })
        .await
        .unwrap();
    assert_eq!(found, Some(not_existing()));

    let modified = plugins
        .update_many(
            &plugin::query! { class: AnyOf(["NotExisting"]) },
            plugin::patch! { class: "Existing not today" },
        )
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let mut found = plugins
        .one(&plugin::query! { name: "p" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.class, "Existing not today");

    found.stage.push("later".into());
    assert!(plugins.update(&found).await.unwrap());

    let all = plugins
        .find_all(
            &plugin::query! {},
            &FindOptions::new().order_by(plugin::Fields::Name, Order::Asc),
        )
        .await
        .unwrap();
    assert_eq!(all, vec![found.clone()]);

    assert!(plugins.delete(&found).await.unwrap());
    assert_eq!(plugins.delete_many(&plugin::query! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn aliased_items_receive_generated_ids() {
    init_tracing();

    let registry = Registry::memory();
    let accounts = registry
        .driver(options())
        .table_for::<AccountItem>()
        .await
        .unwrap();

    let account = accounts
        .insert(AccountItem {
            id: None,
            owner: "kit".into(),
        })
        .await
        .unwrap();
    let id = account.id.clone().unwrap();

    let found = accounts
        .one(&account_item::query! { owner: "kit" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id.as_deref(), Some(id.as_str()));

    assert!(accounts.delete(&found).await.unwrap());
}

#[tokio::test]
async fn unset_optional_ids_are_generated_on_insert() {
    init_tracing();

    let registry = Registry::memory();
    let notes = registry.driver(options()).table_for::<Note>().await.unwrap();

    let note = || Note {
        id: None,
        body: "hello".into(),
        tag: None,
    };
    let first = notes.insert(note()).await.unwrap();
    let second = notes.insert(note()).await.unwrap();

    let first_id = first.id.unwrap();
    let second_id = second.id.unwrap();
    assert_ne!(first_id, "null");
    assert_ne!(first_id, second_id);

    let found = notes
        .one(&note::query! { id: first_id.clone() })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id.as_deref(), Some(first_id.as_str()));
    assert_eq!(found.body, "hello");
}
