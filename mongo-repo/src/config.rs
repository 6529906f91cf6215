use crate::{Result, normalize::{KeyPolicy, NATIVE_ID}};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

/// Where a driver connects to.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DriverOptions {
    pub dsn: String,
    pub db: String,
    /// Ping the server when the connection is first established.
    #[serde(default = "default_verify")]
    pub verify: bool,
}

impl DriverOptions {
    pub fn new(dsn: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            db: db.into(),
            verify: true,
        }
    }
}

fn default_verify() -> bool {
    true
}

/// Per-table primary key configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    #[serde(default = "default_pk")]
    pub pk: String,
    #[serde(default)]
    pub id_as: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            pk: default_pk(),
            id_as: None,
        }
    }
}

impl TableConfig {
    pub fn with_pk(pk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            id_as: None,
        }
    }

    pub fn id_as(mut self, alias: impl Into<String>) -> Self {
        self.id_as = Some(alias.into());
        self
    }

    pub fn key_policy(&self) -> KeyPolicy {
        KeyPolicy::new(self.pk.clone(), self.id_as.clone())
    }
}

fn default_pk() -> String {
    NATIVE_ID.to_owned()
}

/// A driver and the tables served through it.
///
/// ```json
/// {
///   "driver": { "dsn": "mongodb://127.0.0.1:27017", "db": "tests" },
///   "tables": { "plugins": { "pk": "name" } }
/// }
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub driver: DriverOptions,
    #[serde(default)]
    pub tables: BTreeMap<String, TableConfig>,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Configuration of `table`, falling back to the defaults for tables that
    /// are not listed.
    pub fn table(&self, table: &str) -> TableConfig {
        self.tables.get(table).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_with_defaults() {
        let settings = Settings::from_json_str(
            r#"{
                "driver": { "dsn": "mongodb://127.0.0.1:27017", "db": "tests" },
                "tables": {
                    "plugins": { "pk": "name" },
                    "users": { "id_as": "id" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            settings.driver,
            DriverOptions::new("mongodb://127.0.0.1:27017", "tests")
        );
        assert_eq!(settings.table("plugins"), TableConfig::with_pk("name"));
        assert_eq!(settings.table("users"), TableConfig::default().id_as("id"));
        assert_eq!(settings.table("unlisted"), TableConfig::default());
    }

    #[test]
    fn verification_can_be_disabled() {
        let settings = Settings::from_json_str(
            r#"{ "driver": { "dsn": "mongodb://db", "db": "x", "verify": false } }"#,
        )
        .unwrap();

        assert!(!settings.driver.verify);
        assert!(settings.tables.is_empty());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let error = Settings::from_json_str("{").unwrap_err();

        assert!(matches!(error, crate::Error::Config(_)));
    }

    #[test]
    fn key_policy_follows_config() {
        let policy = TableConfig::with_pk("name").key_policy();

        assert_eq!(policy.pk(), "name");
        assert!(!policy.is_native());
    }
}
