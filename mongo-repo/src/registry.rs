use crate::{
    DriverOptions, Error, Item, Record, Result, Settings, Table, TableConfig,
    normalize::KeyPolicy,
    store::{DocumentStore, MemoryStore, MongoStore},
};
use dashmap::DashMap;
use mongodb::{
    Client, Database,
    bson::{Document, doc},
};
use std::sync::Arc;
use tracing::{info, trace};

/// Which adapter a [`Registry`] hands out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Mongo,
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TableKey {
    dsn: String,
    db: String,
    table: String,
}

/// Owns connections and table handles.
///
/// Handles are cached per DSN, per `(DSN, database)` and per
/// `(DSN, database, table)` for the lifetime of the registry; callers asking
/// for the same key share one store.
#[derive(Debug, Default)]
pub struct Registry {
    backend: Backend,
    clients: DashMap<String, Client>,
    databases: DashMap<(String, String), Database>,
    stores: DashMap<TableKey, Arc<dyn DocumentStore>>,
}

impl Registry {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn mongo() -> Self {
        Self::new(Backend::Mongo)
    }

    pub fn memory() -> Self {
        Self::new(Backend::Memory)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn driver(&self, options: DriverOptions) -> Driver<'_> {
        Driver::new(self, options)
    }

    async fn client(&self, options: &DriverOptions) -> Result<Client> {
        let cached = self.clients.get(&options.dsn).map(|client| client.clone());
        if let Some(client) = cached {
            trace!(db = %options.db, "reusing client");
            return Ok(client);
        }

        let connect_error = |source| Error::Connect {
            dsn: options.dsn.clone(),
            source,
        };

        let client = Client::with_uri_str(&options.dsn)
            .await
            .map_err(connect_error)?;

        if options.verify {
            client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(connect_error)?;
        }

        info!(db = %options.db, "connected to MongoDB");

        Ok(self
            .clients
            .entry(options.dsn.clone())
            .or_insert(client)
            .clone())
    }

    async fn database(&self, options: &DriverOptions) -> Result<Database> {
        let key = (options.dsn.clone(), options.db.clone());

        let cached = self.databases.get(&key).map(|database| database.clone());
        if let Some(database) = cached {
            return Ok(database);
        }

        let database = self.client(options).await?.database(&options.db);

        Ok(self.databases.entry(key).or_insert(database).clone())
    }

    /// The shared store behind `table`, connecting first if needed.
    pub async fn store(
        &self,
        options: &DriverOptions,
        table: &str,
    ) -> Result<Arc<dyn DocumentStore>> {
        let key = TableKey {
            dsn: options.dsn.clone(),
            db: options.db.clone(),
            table: table.to_owned(),
        };

        let cached = self.stores.get(&key).map(|store| Arc::clone(&store));
        if let Some(store) = cached {
            trace!(db = %options.db, table, "reusing store");
            return Ok(store);
        }

        trace!(db = %options.db, table, backend = ?self.backend, "opening store");

        let store: Arc<dyn DocumentStore> = match self.backend {
            Backend::Mongo => {
                let database = self.database(options).await?;
                Arc::new(MongoStore::new(database.collection::<Document>(table)))
            }
            Backend::Memory => Arc::new(MemoryStore::new(table)),
        };

        Ok(Arc::clone(&self.stores.entry(key).or_insert(store)))
    }
}

/// A connection target bound to a [`Registry`].
#[derive(Clone, Debug)]
pub struct Driver<'a> {
    registry: &'a Registry,
    options: DriverOptions,
}

impl<'a> Driver<'a> {
    pub fn new(registry: &'a Registry, options: DriverOptions) -> Self {
        Self { registry, options }
    }

    pub fn from_settings(registry: &'a Registry, settings: &Settings) -> Self {
        Self::new(registry, settings.driver.clone())
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub async fn table<T: Record>(&self, name: &str, config: &TableConfig) -> Result<Table<T>> {
        let store = self.registry.store(&self.options, name).await?;

        Ok(Table::new(name, store, config.key_policy()))
    }

    /// Table configured from `settings`, defaults applying to unlisted names.
    pub async fn table_named<T: Record>(&self, settings: &Settings, name: &str) -> Result<Table<T>> {
        self.table(name, &settings.table(name)).await
    }

    pub async fn table_for<I: Item>(&self) -> Result<Table<I>> {
        let store = self.registry.store(&self.options, I::TABLE_NAME).await?;
        let policy = KeyPolicy::new(I::PK, I::ID_AS.map(str::to_owned));

        Ok(Table::new(I::TABLE_NAME, store, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> DriverOptions {
        DriverOptions::new("mongodb://127.0.0.1:27017", "tests")
    }

    #[tokio::test]
    async fn stores_are_shared_per_key() {
        let registry = Registry::memory();

        let a = registry.store(&options(), "plugins").await.unwrap();
        let b = registry.store(&options(), "plugins").await.unwrap();
        let other_table = registry.store(&options(), "users").await.unwrap();
        let other_db = registry
            .store(&DriverOptions::new("mongodb://127.0.0.1:27017", "prod"), "plugins")
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other_table));
        assert!(!Arc::ptr_eq(&a, &other_db));
    }

    #[tokio::test]
    async fn separate_registries_do_not_share() {
        let first = Registry::memory();
        let second = Registry::memory();

        let a = first.store(&options(), "plugins").await.unwrap();
        let b = second.store(&options(), "plugins").await.unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn invalid_dsn_fails_construction() {
        let registry = Registry::mongo();
        let driver = registry.driver(DriverOptions::new("not-a-dsn", "tests"));

        let error = driver
            .table::<Document>("plugins", &TableConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Connect { dsn, .. } if dsn == "not-a-dsn"));
    }

    #[tokio::test]
    async fn tables_carry_configured_policy() {
        let registry = Registry::memory();
        let driver = registry.driver(options());

        let table = driver
            .table::<Document>("plugins", &TableConfig::with_pk("name"))
            .await
            .unwrap();

        assert_eq!(table.name(), "plugins");
        assert_eq!(table.key_policy().pk(), "name");
    }
}
