//! Rendering of docsync filters into MongoDB query documents.

use bson::{Bson, Document, doc};

use docsync_core::{
    error::DocSyncError,
    filter::{CompareOp, FilterVisitor},
};

/// Renders a [`Filter`](docsync_core::filter::Filter) as a MongoDB query document.
///
/// Each condition becomes `{field: {"$op": value}}`; a between condition
/// becomes `{field: {"$gte": low, "$lte": high}}`. The per-field documents
/// are merged into one, so an empty filter renders as `{}`.
pub(crate) struct MongoFilterRenderer;

fn operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "$eq",
        CompareOp::Gt => "$gt",
        CompareOp::Gte => "$gte",
        CompareOp::Lt => "$lt",
        CompareOp::Lte => "$lte",
    }
}

impl FilterVisitor for MongoFilterRenderer {
    type Output = Document;
    type Error = DocSyncError;

    fn visit_compare(&mut self, field: &str, op: CompareOp, value: &Bson) -> Result<Document, DocSyncError> {
        let operator = operator(op);

        Ok(doc! {
            field: { operator: value.clone() },
        })
    }

    fn visit_between(&mut self, field: &str, low: &Bson, high: &Bson) -> Result<Document, DocSyncError> {
        Ok(doc! {
            field: { "$gte": low.clone(), "$lte": high.clone() },
        })
    }

    fn visit_all(&mut self, outputs: Vec<Document>) -> Result<Document, DocSyncError> {
        Ok(outputs.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsync_core::filter::{Condition, Filter};

    #[test]
    fn renders_operators_per_field() {
        let filter: Filter = [
            ("hometown", Condition::compare(CompareOp::Eq, "NY")),
            ("age", Condition::between(10_i64, 20_i64)),
            ("wage", Condition::compare(CompareOp::Lte, 1000.5)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            MongoFilterRenderer.visit_filter(&filter).unwrap(),
            doc! {
                "hometown": { "$eq": "NY" },
                "age": { "$gte": 10_i64, "$lte": 20_i64 },
                "wage": { "$lte": 1000.5 },
            }
        );
    }

    #[test]
    fn empty_filter_renders_empty_document() {
        assert_eq!(MongoFilterRenderer.visit_filter(&Filter::new()).unwrap(), doc! {});
    }
}
