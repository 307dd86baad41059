//! Condition-driven reads against a [`StoreBackend`].
//!
//! A [`ConditionQuery`] bundles a condition expression with its placeholder
//! mappings and attribute types, translates it into a [`Filter`] and runs it.
//! Key-condition queries must select something; scans accept an empty filter
//! expression and then match every document.
//!
//! ```ignore
//! use docsync::query::ConditionQuery;
//!
//! let adults = ConditionQuery::key_conditions("#hometown = :town AND #age >= :age")
//!     .field("#hometown", "hometown")
//!     .field("#age", "age")
//!     .param(":town", "NY")
//!     .param(":age", "18")
//!     .attribute_types(user.attribute_types())
//!     .find(&backend, "odm-users")
//!     .await?;
//! ```

use bson::Bson;
use std::collections::HashMap;

use crate::{
    attribute::AttributeTypes,
    backend::StoreBackend,
    condition::ConditionTranslator,
    error::DocSyncResult,
    filter::Filter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Key conditions; an empty condition is rejected.
    Key,
    /// Filter expression over the whole table; empty matches everything.
    Scan,
}

#[derive(Debug, Clone)]
pub struct ConditionQuery {
    kind: QueryKind,
    expression: String,
    field_mapping: HashMap<String, String>,
    param_mapping: HashMap<String, String>,
    attribute_types: AttributeTypes,
}

impl ConditionQuery {
    pub fn key_conditions(expression: impl Into<String>) -> Self {
        Self::new(QueryKind::Key, expression)
    }

    pub fn filter_expression(expression: impl Into<String>) -> Self {
        Self::new(QueryKind::Scan, expression)
    }

    fn new(kind: QueryKind, expression: impl Into<String>) -> Self {
        Self {
            kind,
            expression: expression.into(),
            field_mapping: HashMap::new(),
            param_mapping: HashMap::new(),
            attribute_types: AttributeTypes::new(),
        }
    }

    /// Maps a `#placeholder` to a field name.
    pub fn field(mut self, placeholder: impl Into<String>, field: impl Into<String>) -> Self {
        self.field_mapping.insert(placeholder.into(), field.into());
        self
    }

    /// Maps a `:placeholder` to a raw value.
    pub fn param(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.param_mapping.insert(placeholder.into(), value.into());
        self
    }

    pub fn fields(mut self, mapping: HashMap<String, String>) -> Self {
        self.field_mapping.extend(mapping);
        self
    }

    pub fn params(mut self, mapping: HashMap<String, String>) -> Self {
        self.param_mapping.extend(mapping);
        self
    }

    pub fn attribute_types(mut self, attribute_types: AttributeTypes) -> Self {
        self.attribute_types = attribute_types;
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn to_filter(&self) -> DocSyncResult<Filter> {
        let filter = ConditionTranslator::new(
            &self.field_mapping,
            &self.param_mapping,
            &self.attribute_types,
        )
        .translate(&self.expression)?;

        match self.kind {
            QueryKind::Key => filter.into_required(),
            QueryKind::Scan => Ok(filter),
        }
    }

    pub async fn find<B: StoreBackend>(&self, backend: &B, table: &str) -> DocSyncResult<Vec<Bson>> {
        let filter = self.to_filter()?;
        backend.query_documents(table, &filter).await
    }

    pub async fn count<B: StoreBackend>(&self, backend: &B, table: &str) -> DocSyncResult<u64> {
        let filter = self.to_filter()?;
        backend.count_documents(table, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attribute::AttributeType,
        error::DocSyncError,
        filter::{CompareOp, Condition},
    };

    #[test]
    fn key_conditions_must_not_be_empty() {
        let err = ConditionQuery::key_conditions("").to_filter().unwrap_err();
        assert!(matches!(err, DocSyncError::Validation(message) if message == "Query condition is empty"));
    }

    #[test]
    fn empty_scan_matches_everything() {
        assert!(ConditionQuery::filter_expression("").to_filter().unwrap().is_empty());
    }

    #[test]
    fn builds_filter_from_mappings() {
        let filter = ConditionQuery::key_conditions("#id = :id")
            .field("#id", "id")
            .param(":id", "42")
            .attribute_types(AttributeTypes::new().with("id", AttributeType::Number))
            .to_filter()
            .unwrap();

        assert_eq!(filter.get("id"), Some(&Condition::compare(CompareOp::Eq, 42_i64)));
    }
}
