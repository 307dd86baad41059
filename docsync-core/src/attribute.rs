//! Declared attribute types used to coerce condition values.
//!
//! Callers describe the type of every field a condition may reference. Only
//! [`AttributeType::Number`] changes how a value is read; every other type passes
//! the raw text through unchanged.

use bson::Bson;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

use crate::error::{DocSyncError, DocSyncResult};

/// Scalar type declared for an entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Binary,
    Bool,
    Null,
    List,
    Map,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Binary => "binary",
            AttributeType::Bool => "bool",
            AttributeType::Null => "null",
            AttributeType::List => "list",
            AttributeType::Map => "map",
        }
    }

    /// Converts raw condition text into a typed value.
    ///
    /// Numbers containing a decimal point become doubles, other numbers become
    /// 64-bit integers. Text that is not a number fails validation.
    pub fn coerce(&self, raw: &str) -> DocSyncResult<Bson> {
        let raw = raw.trim();

        match self {
            AttributeType::Number if raw.contains('.') => raw
                .parse::<f64>()
                .map(Bson::Double)
                .map_err(|_| DocSyncError::validation(format!("Invalid number value: {raw}"))),
            AttributeType::Number => raw
                .parse::<i64>()
                .map(Bson::Int64)
                .map_err(|_| DocSyncError::validation(format!("Invalid number value: {raw}"))),
            _ => Ok(Bson::String(raw.to_string())),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = DocSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(AttributeType::String),
            "number" => Ok(AttributeType::Number),
            "binary" => Ok(AttributeType::Binary),
            "bool" | "boolean" => Ok(AttributeType::Bool),
            "null" => Ok(AttributeType::Null),
            "list" => Ok(AttributeType::List),
            "map" => Ok(AttributeType::Map),
            other => Err(DocSyncError::validation(format!("Unknown attribute type: {other}"))),
        }
    }
}

/// Mapping from stored field name to its declared type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTypes {
    types: HashMap<String, AttributeType>,
}

impl AttributeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the declared type of a field.
    pub fn with(mut self, field: impl Into<String>, attribute_type: AttributeType) -> Self {
        self.insert(field, attribute_type);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, attribute_type: AttributeType) {
        self.types.insert(field.into(), attribute_type);
    }

    pub fn get(&self, field: &str) -> Option<AttributeType> {
        self.types.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Coerces `raw` according to the type declared for `field`.
    pub fn typed_value(&self, field: &str, raw: &str) -> DocSyncResult<Bson> {
        self.get(field)
            .ok_or_else(|| DocSyncError::validation(format!("Unknown attribute: {field}")))?
            .coerce(raw)
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeType)> for AttributeTypes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeType)>>(iter: I) -> Self {
        Self {
            types: iter
                .into_iter()
                .map(|(field, attribute_type)| (field.into(), attribute_type))
                .collect(),
        }
    }
}
