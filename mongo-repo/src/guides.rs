/// ## Getting started
///
/// A [`Table`](crate::Table) is a repository view over one collection. Tables are
/// handed out by a [`Driver`](crate::Driver), which binds connection options to an
/// owned [`Registry`](crate::Registry). The registry caches clients, databases and
/// table stores for as long as it lives, so keep one around instead of creating a
/// new one per request.
///
/// ```ignore
/// use mongo_repo::{DriverOptions, Registry, TableConfig};
/// use mongodb::bson::Document;
///
/// let registry = Registry::mongo();
/// let driver = registry.driver(DriverOptions::new("mongodb://127.0.0.1:27017", "tests"));
///
/// let plugins = driver
///     .table::<Document>("plugins", &TableConfig::with_pk("name"))
///     .await?;
/// ```
///
/// Creating a table against an unreachable server fails with
/// [`Error::Connect`](crate::Error::Connect). The check is a `ping` issued when a
/// client is first opened; set [`DriverOptions::verify`](crate::DriverOptions) to
/// `false` to skip it.
///
/// [`Registry::memory`](crate::Registry::memory) hands out in-process stores with
/// the same semantics, which is what the test suite runs against.
///
/// ### Configuration
///
/// Options can also be loaded from JSON through [`Settings`](crate::Settings):
///
/// ```json
/// {
///   "driver": { "dsn": "mongodb://127.0.0.1:27017", "db": "tests" },
///   "tables": {
///     "plugins": { "pk": "name" },
///     "users": { "id_as": "id" }
///   }
/// }
/// ```
///
/// Tables missing from `tables` use `pk = "_id"` and no alias.
///
/// ### Method overview
///
/// | Method                | Returns          | Corresponding MongoDB Query                                       |
/// |-----------------------|------------------|-------------------------------------------------------------------|
/// | `Table::find_one`     | `Option<T>`      | `db.plugins.findOne(filter, { skip, projection })`                |
/// | `Table::find_all`     | `Vec<T>`         | `db.plugins.find(filter).skip(offset).limit(limit).sort(order)`   |
/// | `Table::insert`       | `T`              | `db.plugins.insertOne(item)`                                      |
/// | `Table::update`       | `bool`           | `db.plugins.replaceOne({ pk: item.pk }, item)`                    |
/// | `Table::update_many`  | `u64`            | `db.plugins.updateMany(filter, { $set: data })`                   |
/// | `Table::delete`       | `bool`           | `db.plugins.deleteOne({ pk: item.pk })`                           |
/// | `Table::delete_many`  | `u64`            | `db.plugins.deleteMany(filter)`                                   |
/// | `Table::drop`         | `bool`           | `db.plugins.drop()`                                               |
/// | `Table::group`        | `&mut Table<T>`  | `db.plugins.aggregate([{ $group: { _id: { f: "$f" }, count: { $sum: 1 } } }])` |
pub mod getting_started {}

/// Queries are plain field → value maps. Before they reach the store every
/// entry goes through [`prepare_query`](crate::translate::prepare_query):
///
/// - scalar values match by equality: `{ class: "A" }` stays `{ class: "A" }`
/// - array values match by membership: `{ stage: ["a", "b"] }` becomes
///   `{ stage: { $in: ["a", "b"] } }`
///
/// Because MongoDB's `$in` also matches array fields that share an element with
/// the operand, a stored `stage: ["not", "existing"]` is found by
/// `{ stage: ["not"] }`.
///
/// Operators are never passed through by name, so a query can't be used to
/// smuggle `$where` or `$expr` into the store. Raw documents can still be handed
/// to [`DocumentStore`](crate::DocumentStore) directly.
///
/// ### Helper macros
///
/// `#[derive(Item)]` generates a module named after the item (in `snake_case`)
/// with a `Fields` enum and two macros:
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Item)]
/// #[item(table = "plugins", pk = "name")]
/// struct Plugin {
///     name: String,
///     #[serde(rename = "type")]
///     class: String,
///     stage: Vec<String>,
/// }
///
/// // { type: "A", stage: { $in: ["x", "y"] } }
/// let query = plugin::query! {
///     class: "A",
///     stage: AnyOf(["x", "y"]),
/// };
///
/// // { type: "B" }
/// let data = plugin::patch! { class: "B" };
///
/// plugins.update_many(&query, data).await?;
/// ```
///
/// Field names are checked at compile time and renamed fields are mapped to the
/// names they are stored under.
///
/// Without the derive, the table name defaults to the struct name in
/// `snake_case` with any `_item` suffix removed.
pub mod queries {}

/// Every table has a logical primary key, `pk`, and optionally an `id_as` alias.
///
/// When `pk` is `_id`:
///
/// - records are returned with `_id` as a string (hex for object ids)
/// - hex strings in queries (operator operands included) and identity filters
///   are turned back into object ids, other strings are left alone
/// - [`Table::insert`](crate::Table::insert) copies the generated id into the
///   returned item, under `id_as` if configured; the alias is also written to
///   the stored record so later reads carry it
///
/// When `pk` is any other field, `_id` is an implementation detail of the store:
/// it is stripped from every returned record and never written back.
///
/// [`Table::update`](crate::Table::update) and
/// [`Table::delete`](crate::Table::delete) locate the stored record by the item's
/// pk. An item without one fails with
/// [`Error::MissingKey`](crate::Error::MissingKey). `update` replaces the whole
/// record, so fields missing from the item are removed from the store.
///
/// An `_id` serialized as `null`, as an unset `Option` does, is dropped on
/// insert and the store generates one.
pub mod identifiers {}

/// Write results are reported through [`WriteOutcome`](crate::WriteOutcome).
/// Stores answer either with an acknowledgement flag or with a count of affected
/// records, and tables fold both into the return types in the
/// [method overview](super::getting_started).
///
/// | Store answer        | `succeeded()` | `affected()` |
/// |---------------------|---------------|--------------|
/// | `Acknowledged(true)`  | `true`        | `1`          |
/// | `Acknowledged(false)` | `false`       | `0`          |
/// | `Affected(n)`         | `n > 0`       | `n`          |
pub mod write_outcomes {}
