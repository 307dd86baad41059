//! Backend-neutral filters produced by the condition translator.
//!
//! A [`Filter`] is an ordered mapping from field name to a single [`Condition`].
//! Backends consume it through the [`FilterVisitor`] trait: the MongoDB backend
//! renders it into a query document, the in-memory backend evaluates it
//! against stored documents.
//!
//! # Example
//!
//! ```ignore
//! use docsync::filter::{Filter, Condition, CompareOp};
//! use bson::Bson;
//!
//! let mut filter = Filter::new();
//! filter.insert("age", Condition::compare(CompareOp::Gt, 10_i64));
//! filter.insert("name", Condition::between("A", "M"));
//! ```

use bson::Bson;
use serde::Serialize;
use std::fmt;

use crate::error::{DocSyncError, DocSyncResult};

/// Comparison operators understood by the condition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    /// Neutral operator name (`eq`, `gt`, `gte`, `lt`, `lte`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }

    /// Symbol as written in a condition expression.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The condition attached to one field of a [`Filter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    /// `{op: value}`
    Compare { op: CompareOp, value: Bson },
    /// `{gte: low, lte: high}`; bounds are taken as given.
    Between { low: Bson, high: Bson },
}

impl Condition {
    pub fn compare(op: CompareOp, value: impl Into<Bson>) -> Self {
        Condition::Compare { op, value: value.into() }
    }

    pub fn between(low: impl Into<Bson>, high: impl Into<Bson>) -> Self {
        Condition::Between { low: low.into(), high: high.into() }
    }
}

/// Ordered field-to-condition mapping.
///
/// Inserting a field that is already present replaces its condition in place;
/// two conditions on one field are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the condition for `field`, returning the condition it replaced.
    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) -> Option<Condition> {
        let field = field.into();

        match self.conditions.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => Some(std::mem::replace(existing, condition)),
            None => {
                self.conditions.push((field, condition));
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, condition)| condition)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions
            .iter()
            .map(|(name, condition)| (name.as_str(), condition))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(name, _)| name.as_str())
    }

    /// Rejects an empty filter.
    ///
    /// Key-condition queries must select something; scans may match everything.
    pub fn into_required(self) -> DocSyncResult<Self> {
        if self.is_empty() {
            return Err(DocSyncError::validation("Query condition is empty"));
        }

        Ok(self)
    }
}

impl IntoIterator for Filter {
    type Item = (String, Condition);
    type IntoIter = std::vec::IntoIter<(String, Condition)>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Condition)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, Condition)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (field, condition) in iter {
            filter.insert(field, condition);
        }
        filter
    }
}

/// Walks a [`Filter`] condition by condition.
///
/// Implementors produce one output per condition and then fold them with
/// [`FilterVisitor::visit_all`]. Conditions are visited in filter order.
pub trait FilterVisitor {
    type Output;
    type Error: Into<DocSyncError>;

    fn visit_compare(
        &mut self,
        field: &str,
        op: CompareOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_between(
        &mut self,
        field: &str,
        low: &Bson,
        high: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_all(&mut self, outputs: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;

    fn visit_condition(
        &mut self,
        field: &str,
        condition: &Condition,
    ) -> Result<Self::Output, Self::Error> {
        match condition {
            Condition::Compare { op, value } => self.visit_compare(field, *op, value),
            Condition::Between { low, high } => self.visit_between(field, low, high),
        }
    }

    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        let outputs = filter
            .iter()
            .map(|(field, condition)| self.visit_condition(field, condition))
            .collect::<Result<Vec<_>, _>>()?;

        self.visit_all(outputs)
    }
}
