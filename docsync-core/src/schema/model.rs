//! In-memory representation of a store schema: tables, indexes and the changes between them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

use crate::error::{DocSyncError, DocSyncResult};

/// Name of the index synthesized over a table's primary-key columns.
pub const PRIMARY_KEY_INDEX: &str = "primary_key";

/// A secondary (or primary-key) index over one or more columns.
///
/// Indexes without an explicit name are named after their columns, lower-cased
/// and joined with `_`. Explicit names have `-` replaced by `_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    table: String,
    columns: Vec<String>,
}

impl Index {
    /// Creates an index named after its columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::named("", columns)
    }

    /// Creates an index with an explicit name; an empty name falls back to the derived one.
    pub fn named<I, S>(name: impl AsRef<str>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect::<Vec<String>>();
        let name = match name.as_ref() {
            "" => columns
                .iter()
                .map(|column| column.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            explicit => explicit.replace('-', "_"),
        };

        Self { name, table: String::new(), columns }
    }

    /// Creates an index under the exact name a live store reports for it.
    pub fn from_store<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: String::new(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the owning table.
    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// A table (collection) with its primary key and indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    #[serde(default)]
    primary_key: Vec<String>,
    #[serde(default)]
    indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Sets the primary-key columns and registers the matching [`PRIMARY_KEY_INDEX`].
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self.indexes.retain(|index| index.name() != PRIMARY_KEY_INDEX);
        self.push_index(Index::named(PRIMARY_KEY_INDEX, self.primary_key.clone()));
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.push_index(index);
        self
    }

    /// Appends an index, attaching it to this table.
    pub fn push_index(&mut self, index: Index) {
        let index = index.on_table(self.name.clone());
        self.indexes.push(index);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|index| index.name() == name)
    }

    /// Index lookup is by name only; columns are not compared.
    pub fn has_index(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn to_json(&self) -> DocSyncResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A set of tables keyed by name.
///
/// Iteration follows table name order, which keeps diff output stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    tables: BTreeMap<String, Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for Schema {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for table in iter {
            schema.insert(table);
        }
        schema
    }
}

/// How a schema item differs between the desired and the actual schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChangeType {
    NoChange = 0,
    New = 1,
    /// Never produced by [`diff`](crate::schema::diff::diff); kept so callers
    /// constructing changes by hand get a defined, non-destructive outcome.
    Modified = 2,
    ToDelete = 3,
}

impl TryFrom<u8> for ChangeType {
    type Error = DocSyncError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ChangeType::NoChange),
            1 => Ok(ChangeType::New),
            2 => Ok(ChangeType::Modified),
            3 => Ok(ChangeType::ToDelete),
            other => Err(DocSyncError::validation(format!(
                "Error: unknown change type: {other}"
            ))),
        }
    }
}

impl From<ChangeType> for u8 {
    fn from(change_type: ChangeType) -> Self {
        change_type as u8
    }
}

/// The schema object a [`Change`] refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaItem {
    Table(Table),
    Index(Index),
}

impl SchemaItem {
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaItem::Table(_) => "table",
            SchemaItem::Index(_) => "index",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SchemaItem::Table(table) => table.name(),
            SchemaItem::Index(index) => index.name(),
        }
    }

    /// Name of the table the item lives in (the table itself for tables).
    pub fn table_name(&self) -> &str {
        match self {
            SchemaItem::Table(table) => table.name(),
            SchemaItem::Index(index) => index.table(),
        }
    }
}

/// A single reconciliation step: a table or index tagged with its change type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    item: SchemaItem,
    change_type: ChangeType,
}

impl Change {
    pub fn new(item: SchemaItem, change_type: ChangeType) -> Self {
        Self { item, change_type }
    }

    pub fn table(table: Table, change_type: ChangeType) -> Self {
        Self::new(SchemaItem::Table(table), change_type)
    }

    pub fn index(index: Index, change_type: ChangeType) -> Self {
        Self::new(SchemaItem::Index(index), change_type)
    }

    pub fn item(&self) -> &SchemaItem {
        &self.item
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Human-readable description used for dry runs and apply logs.
    ///
    /// Returns `None` for [`ChangeType::NoChange`] and for index creations or
    /// drops not attached to a table, which the applier rejects in both modes.
    pub fn describe(&self) -> Option<String> {
        match (&self.item, self.change_type) {
            (_, ChangeType::NoChange) => None,
            (item, ChangeType::Modified) => {
                Some(format!("Notice: change {} name is unsupported", item.kind()))
            }
            (SchemaItem::Table(table), ChangeType::New) => {
                Some(format!("Will create table: {}", table.name()))
            }
            (SchemaItem::Table(table), ChangeType::ToDelete) => {
                Some(format!("Will drop table: {}", table.name()))
            }
            (SchemaItem::Index(index), _) if index.table().is_empty() => None,
            (SchemaItem::Index(index), ChangeType::New) => Some(format!(
                "Will create index {} ON {} ({})",
                index.name(),
                index.table(),
                index.columns().join(",")
            )),
            (SchemaItem::Index(index), ChangeType::ToDelete) => Some(format!(
                "Will drop INDEX {} from table {}",
                index.name(),
                index.table()
            )),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe().as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_name_is_derived_from_columns() {
        assert_eq!(Index::new(["Hometown", "Age"]).name(), "hometown_age");
        assert_eq!(Index::named("", ["Wage"]).name(), "wage");
    }

    #[test]
    fn explicit_index_name_replaces_dashes() {
        assert_eq!(Index::named("by-home-town", ["hometown"]).name(), "by_home_town");
    }

    #[test]
    fn stored_index_name_is_kept_verbatim() {
        let index = Index::from_store("by-town", ["hometown"]).on_table("users");

        assert_eq!(index.name(), "by-town");
        assert_eq!(
            Change::index(index, ChangeType::ToDelete).to_string(),
            "Will drop INDEX by-town from table users"
        );
    }

    #[test]
    fn primary_key_registers_index_once() {
        let table = Table::new("users")
            .with_primary_key(["id"])
            .with_primary_key(["id", "range"]);

        assert_eq!(table.primary_key(), ["id", "range"]);
        assert_eq!(table.indexes().len(), 1);

        let pk = table.index(PRIMARY_KEY_INDEX).unwrap();
        assert_eq!(pk.table(), "users");
        assert_eq!(pk.columns(), ["id", "range"]);
    }

    #[test]
    fn table_serializes_with_indexes() {
        let table = Table::new("users")
            .with_primary_key(["id"])
            .with_index(Index::new(["hometown"]));

        assert_eq!(
            table.to_json().unwrap(),
            serde_json::json!({
                "name": "users",
                "primary_key": ["id"],
                "indexes": [
                    { "name": "primary_key", "table": "users", "columns": ["id"] },
                    { "name": "hometown", "table": "users", "columns": ["hometown"] },
                ],
            })
        );
    }

    #[test]
    fn change_codes_round_trip_and_reject_unknown() {
        assert_eq!(ChangeType::try_from(3).unwrap(), ChangeType::ToDelete);
        assert_eq!(u8::from(ChangeType::New), 1);

        let err = ChangeType::try_from(9).unwrap_err();
        assert!(matches!(err, DocSyncError::Validation(_)));
    }

    #[test]
    fn describes_changes() {
        let users = Table::new("users");
        let index = Index::new(["hometown", "age"]).on_table("users");

        assert_eq!(
            Change::table(users.clone(), ChangeType::New).describe().unwrap(),
            "Will create table: users"
        );
        assert_eq!(
            Change::table(users.clone(), ChangeType::ToDelete).to_string(),
            "Will drop table: users"
        );
        assert_eq!(
            Change::index(index.clone(), ChangeType::New).to_string(),
            "Will create index hometown_age ON users (hometown,age)"
        );
        assert_eq!(
            Change::index(index.clone(), ChangeType::ToDelete).to_string(),
            "Will drop INDEX hometown_age from table users"
        );
        assert_eq!(
            Change::table(users.clone(), ChangeType::Modified).to_string(),
            "Notice: change table name is unsupported"
        );
        assert_eq!(
            Change::index(index, ChangeType::Modified).to_string(),
            "Notice: change index name is unsupported"
        );
        assert_eq!(Change::table(users, ChangeType::NoChange).describe(), None);
    }
}
