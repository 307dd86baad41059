//! Connection and schema-sync configuration.
//!
//! ```toml
//! endpoint = "mongodb://127.0.0.1:27017"
//! database = "odm-test"
//! table_prefix = "odm-"
//! debug = true
//!
//! [[entities]]
//! name = "User"
//! table_name = "users"
//! primary_index = { hash = "id" }
//! secondary_indexes = [{ name = "hometown-age", hash = "hometown", range = "age" }]
//! attributes = { id = "number", age = "number", hometown = "string" }
//! ```

use serde::Deserialize;
use std::{fs, path::Path};

use crate::{
    error::{DocSyncError, DocSyncResult},
    schema::entity::EntityDefinition,
};

pub const DEFAULT_ENDPOINT: &str = "mongodb://127.0.0.1:27017";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Store connection string.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Database holding the managed tables.
    pub database: String,
    /// Prepended to every entity table name.
    #[serde(default)]
    pub table_prefix: String,
    /// Enables destructive commands such as dropping the whole schema.
    #[serde(default)]
    pub debug: bool,
    /// Entities managed through configuration rather than code.
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl SyncConfig {
    pub fn new(endpoint: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            database: database.into(),
            table_prefix: String::new(),
            debug: false,
            entities: Vec::new(),
        }
    }

    pub fn with_table_prefix(mut self, table_prefix: impl Into<String>) -> Self {
        self.table_prefix = table_prefix.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn from_toml_str(source: &str) -> DocSyncResult<Self> {
        let config: SyncConfig = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DocSyncResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            DocSyncError::Configuration(format!("Cannot read {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> DocSyncResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(DocSyncError::Configuration("endpoint must not be empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(DocSyncError::Configuration("database must not be empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeType;

    #[test]
    fn parses_full_configuration() {
        let config = SyncConfig::from_toml_str(
            r#"
            endpoint = "mongodb://db:27017"
            database = "odm-test"
            table_prefix = "odm-"
            debug = true

            [[entities]]
            name = "User"
            table_name = "users"
            primary_index = { hash = "id" }
            secondary_indexes = [{ name = "hometown-age", hash = "hometown", range = "age" }]
            attributes = { id = "number", age = "number" }
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "mongodb://db:27017");
        assert_eq!(config.table_prefix, "odm-");
        assert!(config.debug);

        let user = &config.entities[0];
        assert_eq!(user.secondary_indexes[0].key.range.as_deref(), Some("age"));
        assert_eq!(user.attributes.get("age"), Some(&AttributeType::Number));
    }

    #[test]
    fn applies_defaults() {
        let config = SyncConfig::from_toml_str(r#"database = "odm""#).unwrap();

        assert_eq!(config, SyncConfig::new(DEFAULT_ENDPOINT, "odm"));
    }

    #[test]
    fn rejects_missing_or_blank_database() {
        assert!(matches!(
            SyncConfig::from_toml_str(r#"endpoint = "mongodb://x""#),
            Err(DocSyncError::Configuration(_))
        ));
        assert!(matches!(
            SyncConfig::from_toml_str(r#"database = " ""#),
            Err(DocSyncError::Configuration(_))
        ));
    }
}
