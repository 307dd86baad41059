//! Filter evaluation for in-memory document matching.

use bson::{Bson, Document, datetime::DateTime};
use std::cmp::Ordering;

use docsync_core::{
    error::DocSyncError,
    filter::{CompareOp, Filter, FilterVisitor},
};

/// Comparable view of a BSON scalar.
///
/// Integers and doubles are normalized to `f64` so `Int64(10)` equals `Double(10.0)`.
#[derive(Debug, PartialEq)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    /// Arrays, documents and other non-scalar values; never ordered.
    Opaque(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            other => Comparable::Opaque(other),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Opaque(a), Comparable::Opaque(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Evaluates a [`Filter`] against one stored document.
///
/// Conditions on missing fields, and comparisons between values of different
/// kinds, do not match.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn matches(document: &'a Bson, filter: &Filter) -> bool {
        match document.as_document() {
            Some(document) => DocumentEvaluator::new(document)
                .visit_filter(filter)
                .unwrap_or(false),
            None => false,
        }
    }

    fn ordering(&self, field: &str, value: &Bson) -> Option<Ordering> {
        let stored = self.document.get(field)?;
        Comparable::from(stored).partial_cmp(&Comparable::from(value))
    }
}

impl<'a> FilterVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocSyncError;

    fn visit_compare(&mut self, field: &str, op: CompareOp, value: &Bson) -> Result<bool, DocSyncError> {
        Ok(match self.ordering(field, value) {
            Some(ordering) => match op {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Gte => ordering != Ordering::Less,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Lte => ordering != Ordering::Greater,
            },
            None => false,
        })
    }

    fn visit_between(&mut self, field: &str, low: &Bson, high: &Bson) -> Result<bool, DocSyncError> {
        Ok(self.visit_compare(field, CompareOp::Gte, low)? && self.visit_compare(field, CompareOp::Lte, high)?)
    }

    fn visit_all(&mut self, outputs: Vec<bool>) -> Result<bool, DocSyncError> {
        Ok(outputs.into_iter().all(|matched| matched))
    }
}
