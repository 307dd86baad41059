//! In-memory store backend.
//!
//! Tables hold their indexes and a flat list of BSON documents behind an
//! async-aware read-write lock. Queries scan every document of a table.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use docsync_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::DocSyncResult,
    filter::Filter,
    schema::model::{Index, Table},
};

use crate::evaluator::DocumentEvaluator;

#[derive(Debug, Default, Clone)]
struct TableState {
    indexes: Vec<Index>,
    documents: Vec<Bson>,
}

type StoreMap = HashMap<String, TableState>;

/// Thread-safe in-memory [`StoreBackend`].
///
/// `InMemoryStore` is cloneable; clones share the same tables. Indexes are
/// recorded for introspection only and do not speed up queries.
///
/// # Example
///
/// ```ignore
/// use docsync_memory::InMemoryStore;
/// use docsync::{backend::StoreBackend, schema::model::Index};
///
/// let store = InMemoryStore::new();
/// store.create_index(&Index::new(["hometown"]).on_table("odm-users")).await?;
/// assert_eq!(store.list_tables().await?.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    tables: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Appends documents to `table`, creating the table if needed.
    ///
    /// Documents are stored as given; no index is enforced.
    pub async fn insert_documents(&self, table: &str, documents: impl IntoIterator<Item = Bson>) {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .documents
            .extend(documents);
    }

    /// Creates an empty table with no indexes. Existing tables are left alone.
    pub async fn create_table(&self, table: &str) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default();
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn list_tables(&self) -> DocSyncResult<Vec<Table>> {
        let tables = self.tables.read().await;
        let mut listed = tables
            .iter()
            .map(|(name, state)| {
                state
                    .indexes
                    .iter()
                    .cloned()
                    .fold(Table::new(name.clone()), |table, index| table.with_index(index))
            })
            .collect::<Vec<_>>();

        listed.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(listed)
    }

    async fn create_index(&self, index: &Index) -> DocSyncResult<()> {
        let mut tables = self.tables.write().await;
        let state = tables.entry(index.table().to_string()).or_default();

        if state.indexes.iter().any(|existing| existing.name() == index.name()) {
            debug!(table = index.table(), index = index.name(), "index already exists");
            return Ok(());
        }

        state.indexes.push(index.clone());
        Ok(())
    }

    async fn drop_index(&self, table: &str, index: &str) -> DocSyncResult<()> {
        let mut tables = self.tables.write().await;

        match tables.get_mut(table) {
            Some(state) => state.indexes.retain(|existing| existing.name() != index),
            None => debug!(table, index, "table not found, nothing to drop"),
        }

        Ok(())
    }

    async fn drop_table(&self, table: &str) -> DocSyncResult<()> {
        if self.tables.write().await.remove(table).is_none() {
            debug!(table, "table not found, nothing to drop");
        }

        Ok(())
    }

    async fn query_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<Vec<Bson>> {
        let tables = self.tables.read().await;

        Ok(tables
            .get(table)
            .map(|state| {
                state
                    .documents
                    .iter()
                    .filter(|document| DocumentEvaluator::matches(document, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<u64> {
        let tables = self.tables.read().await;

        Ok(tables
            .get(table)
            .map(|state| {
                state
                    .documents
                    .iter()
                    .filter(|document| DocumentEvaluator::matches(document, filter))
                    .count() as u64
            })
            .unwrap_or(0))
    }
}

/// Builder for [`InMemoryStore`].
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocSyncResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docsync_core::filter::{CompareOp, Condition};

    #[tokio::test]
    async fn create_index_is_idempotent() {
        let store = InMemoryStore::new();
        let index = Index::named("hometown-age", ["hometown", "age"]).on_table("users");

        store.create_index(&index).await.unwrap();
        store.create_index(&index).await.unwrap();

        let tables = store.list_tables().await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].indexes().len(), 1);
        assert_eq!(tables[0].indexes()[0].name(), "hometown_age");
    }

    #[tokio::test]
    async fn dropping_missing_targets_is_a_no_op() {
        let store = InMemoryStore::new();

        store.drop_index("ghost", "nothing").await.unwrap();
        store.drop_table("ghost").await.unwrap();

        store.create_table("users").await;
        store.drop_index("users", "nothing").await.unwrap();
        assert_eq!(store.list_tables().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drop_table_removes_documents() {
        let store = InMemoryStore::builder().build().await.unwrap();
        store
            .insert_documents("users", [Bson::Document(doc! { "id": 1_i64 })])
            .await;

        store.drop_table("users").await.unwrap();

        assert!(store.list_tables().await.unwrap().is_empty());
        assert_eq!(store.count_documents("users", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_applies_filter() {
        let store = InMemoryStore::new();
        store
            .insert_documents(
                "users",
                [
                    Bson::Document(doc! { "name": "Alice", "age": 12_i64 }),
                    Bson::Document(doc! { "name": "Bob", "age": 30_i64 }),
                ],
            )
            .await;

        let filter: Filter = [("age", Condition::compare(CompareOp::Gt, 18_i64))]
            .into_iter()
            .collect();

        let found = store.query_documents("users", &filter).await.unwrap();
        assert_eq!(found, vec![Bson::Document(doc! { "name": "Bob", "age": 30_i64 })]);
        assert_eq!(store.count_documents("users", &Filter::new()).await.unwrap(), 2);
    }
}
