//! mongo-repo maps generic repository operations onto MongoDB-compatible
//! document stores.
//!
//! ## Example
//!
//! ```ignore
//! // Define an item
//! #[derive(Serialize, Deserialize, Item)]
//! #[item(table = "plugins", pk = "name")]
//! struct Plugin {
//!   name: String,
//!   class: String,
//!   stage: Vec<String>,
//! }
//!
//! // Connect through an owned registry
//! let registry = Registry::mongo();
//! let driver = registry.driver(DriverOptions::new("mongodb://127.0.0.1:27017", "tests"));
//! let plugins = driver.table_for::<Plugin>().await?;
//!
//! // Insert an item
//! plugins.insert(Plugin {
//!   name: "p".into(),
//!   class: "NotExisting".into(),
//!   stage: vec!["not".into(), "existing".into()],
//! }).await?;
//!
//! // Array values match by set membership
//! let plugin: Option<Plugin> = plugins.one(&plugin::query! {
//!   stage: ["not"],
//! }).await?;
//!
//! // Update every matching item
//! plugins.update_many(
//!   &plugin::query! { class: "NotExisting" },
//!   plugin::patch! { class: "Existing not today" },
//! ).await?;
//!
//! // Delete an item by its pk
//! plugins.delete(&plugin.unwrap()).await?;
//! ```
//!
//! See [`guides`] module to learn more!

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc
)]

use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Display;

pub use mongo_repo_macros::{Item, construct_patch, construct_query};
pub use mongodb;

mod config;
mod error;
pub mod guides;
pub mod normalize;
mod outcome;
mod query;
mod registry;
pub mod store;
mod table;
pub mod translate;

pub use config::{DriverOptions, Settings, TableConfig};
pub use error::{Error, Result};
pub use normalize::KeyPolicy;
pub use outcome::WriteOutcome;
pub use query::{FindOptions, Order, Query};
pub use registry::{Backend, Driver, Registry};
pub use store::DocumentStore;
pub use table::{Grouping, Table};

/// Anything a [`Table`] can store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T: Serialize + DeserializeOwned + Send + Sync + 'static> Record for T {}

/// A record type bound to a table, usually derived with `#[derive(Item)]`.
pub trait Item: Record {
    type Fields: Display + Send + 'static;

    const TABLE_NAME: &'static str;

    const PK: &'static str;

    const ID_AS: Option<&'static str>;
}
