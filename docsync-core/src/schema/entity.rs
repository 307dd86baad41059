//! Entity metadata and the desired schema derived from it.
//!
//! Each managed entity describes its table, its primary key (a hash property
//! and an optional range property) and its secondary indexes. Key members are
//! property names; [`EntityDefinition::field_name`] maps them to the field
//! names actually stored.
//!
//! # Example
//!
//! ```ignore
//! use docsync::schema::entity::{Entity, EntityDefinition, KeyDefinition};
//! use docsync::attribute::AttributeType;
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn definition() -> EntityDefinition {
//!         EntityDefinition::new("User", "users", KeyDefinition::hash("id"))
//!             .with_secondary_index("hometown-age", KeyDefinition::hash("hometown").with_range("age"))
//!             .with_attribute("id", AttributeType::Number)
//!             .with_attribute("age", AttributeType::Number)
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::{
    attribute::{AttributeType, AttributeTypes},
    error::{DocSyncError, DocSyncResult},
    schema::model::{Index, Schema, Table},
};

/// A hash property with an optional range property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub hash: String,
    #[serde(default)]
    pub range: Option<String>,
}

impl KeyDefinition {
    pub fn hash(property: impl Into<String>) -> Self {
        Self { hash: property.into(), range: None }
    }

    pub fn with_range(mut self, property: impl Into<String>) -> Self {
        self.range = Some(property.into());
        self
    }

    fn properties(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash.as_str()).chain(
            self.range
                .as_deref()
                .filter(|range| !range.is_empty()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryIndexDefinition {
    pub name: String,
    #[serde(flatten)]
    pub key: KeyDefinition,
}

/// Metadata of one managed entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Entity name, used in logs only.
    pub name: String,
    /// Table name without the configured prefix.
    pub table_name: String,
    /// Projected entities are read-only views over another entity's table.
    #[serde(default)]
    pub projected: bool,
    pub primary_index: KeyDefinition,
    #[serde(default)]
    pub secondary_indexes: Vec<SecondaryIndexDefinition>,
    /// Property name to stored field name.
    #[serde(default)]
    pub field_names: HashMap<String, String>,
    /// Stored field name to declared type.
    #[serde(default)]
    pub attributes: HashMap<String, AttributeType>,
}

impl EntityDefinition {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        primary_index: KeyDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            projected: false,
            primary_index,
            secondary_indexes: Vec::new(),
            field_names: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn projected(mut self) -> Self {
        self.projected = true;
        self
    }

    pub fn with_secondary_index(mut self, name: impl Into<String>, key: KeyDefinition) -> Self {
        self.secondary_indexes.push(SecondaryIndexDefinition { name: name.into(), key });
        self
    }

    /// Stores `property` under a different field name.
    pub fn with_field(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.field_names.insert(property.into(), field.into());
        self
    }

    pub fn with_attribute(mut self, field: impl Into<String>, attribute_type: AttributeType) -> Self {
        self.attributes.insert(field.into(), attribute_type);
        self
    }

    /// Stored field name of `property`; properties without a mapping keep their name.
    pub fn field_name<'a>(&'a self, property: &'a str) -> &'a str {
        self.field_names
            .get(property)
            .map(String::as_str)
            .unwrap_or(property)
    }

    /// Declared attribute types, ready for the condition translator.
    pub fn attribute_types(&self) -> AttributeTypes {
        self.attributes
            .iter()
            .map(|(field, attribute_type)| (field.clone(), *attribute_type))
            .collect()
    }

    fn columns(&self, key: &KeyDefinition) -> Vec<String> {
        key.properties()
            .map(|property| self.field_name(property).to_string())
            .collect()
    }

    /// Builds the desired table, prefixing its name with `table_prefix`.
    ///
    /// The primary-key index comes first, followed by the secondary indexes in
    /// declaration order.
    pub fn to_table(&self, table_prefix: &str) -> DocSyncResult<Table> {
        if self.table_name.is_empty() {
            return Err(DocSyncError::validation(format!(
                "Entity {} has no table name",
                self.name
            )));
        }
        if self.primary_index.hash.is_empty() {
            return Err(DocSyncError::validation(format!(
                "Entity {} has no primary hash key",
                self.name
            )));
        }

        let mut table = Table::new(format!("{table_prefix}{}", self.table_name))
            .with_primary_key(self.columns(&self.primary_index));

        for secondary in &self.secondary_indexes {
            if secondary.key.hash.is_empty() {
                return Err(DocSyncError::validation(format!(
                    "Index {} of entity {} has no hash key",
                    secondary.name, self.name
                )));
            }
            table.push_index(Index::named(&secondary.name, self.columns(&secondary.key)));
        }

        Ok(table)
    }
}

/// A type that carries its own entity metadata.
pub trait Entity {
    fn definition() -> EntityDefinition;
}

/// Builds the desired schema of every non-projected entity.
pub fn desired_schema<'a>(
    entities: impl IntoIterator<Item = &'a EntityDefinition>,
    table_prefix: &str,
) -> DocSyncResult<Schema> {
    let mut schema = Schema::new();

    for entity in entities {
        if entity.projected {
            info!(
                entity = %entity.name,
                "Class {} is projected class, will not create table.",
                entity.name
            );
            continue;
        }

        schema.insert(entity.to_table(table_prefix)?);
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::PRIMARY_KEY_INDEX;

    fn user() -> EntityDefinition {
        EntityDefinition::new("User", "users", KeyDefinition::hash("id"))
            .with_secondary_index("hometown-age", KeyDefinition::hash("hometown").with_range("age"))
            .with_secondary_index("", KeyDefinition::hash("wage"))
            .with_field("hometown", "home_town")
            .with_attribute("id", AttributeType::Number)
            .with_attribute("age", AttributeType::Number)
    }

    #[test]
    fn builds_prefixed_table_with_mapped_columns() {
        let table = user().to_table("odm-").unwrap();

        assert_eq!(table.name(), "odm-users");
        assert_eq!(table.primary_key(), ["id"]);

        let names = table
            .indexes()
            .iter()
            .map(|index| index.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![PRIMARY_KEY_INDEX, "hometown_age", "wage"]);
        assert_eq!(table.index("hometown_age").unwrap().columns(), ["home_town", "age"]);
        assert!(table.indexes().iter().all(|index| index.table() == "odm-users"));
    }

    #[test]
    fn range_key_joins_primary_key() {
        let entity = EntityDefinition::new("Game", "games", KeyDefinition::hash("gamecode").with_range("family"));
        assert_eq!(entity.to_table("").unwrap().primary_key(), ["gamecode", "family"]);
    }

    #[test]
    fn projected_entities_are_skipped() {
        let projection = EntityDefinition::new("UserProjection", "users", KeyDefinition::hash("id")).projected();
        let schema = desired_schema([&user(), &projection], "").unwrap();

        assert_eq!(schema.len(), 1);
        assert!(schema.contains("users"));
    }

    #[test]
    fn missing_hash_key_is_rejected() {
        let entity = EntityDefinition::new("Broken", "broken", KeyDefinition::hash(""));
        assert!(matches!(entity.to_table(""), Err(DocSyncError::Validation(_))));
    }

    #[test]
    fn exposes_attribute_types() {
        let types = user().attribute_types();
        assert_eq!(types.get("age"), Some(AttributeType::Number));
        assert_eq!(types.get("name"), None);
    }
}
