//! Storage backend abstraction used by the schema engine and condition queries.
//!
//! The [`StoreBackend`] trait is the full capability set the core needs from a
//! live store: introspection, index and table management, and filtered reads.
//! Each concrete store ships one implementation, which is injected into
//! [`ChangeApplier`](crate::schema::apply::ChangeApplier) and
//! [`SchemaTool`](crate::schema::tool::SchemaTool) by generic parameter.
//!
//! # Idempotence
//!
//! Applying the same change list twice must be safe, so implementations treat
//! creating an index whose name already exists, dropping an index that is
//! absent and dropping a missing table as successful no-ops.
//!
//! # Example
//!
//! ```ignore
//! use docsync::backend::StoreBackend;
//! use docsync::schema::model::Index;
//!
//! let backend = MyBackendImpl::new();
//! backend.create_index(&Index::new(["hometown"]).on_table("users")).await?;
//! let schema = backend.introspect().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::fmt::Debug;

use crate::{
    error::DocSyncResult,
    filter::Filter,
    schema::model::{Index, Schema, Table},
};

/// Abstract interface for the store a schema is synchronized against.
///
/// All implementations must be thread-safe. Every failure is reported as
/// [`DocSyncError::StoreOperation`](crate::error::DocSyncError::StoreOperation)
/// and is never retried by the core.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Lists every user table with its indexes.
    ///
    /// The store's implicit identity index and internal bookkeeping tables
    /// are excluded. Introspected tables carry no primary-key columns.
    async fn list_tables(&self) -> DocSyncResult<Vec<Table>>;

    /// Creates an ascending index named [`Index::name`] on [`Index::table`].
    ///
    /// The table is created implicitly when it does not exist yet. An index
    /// with the same name already present is left untouched.
    async fn create_index(&self, index: &Index) -> DocSyncResult<()>;

    /// Drops the named index. Missing indexes and tables are ignored.
    async fn drop_index(&self, table: &str, index: &str) -> DocSyncResult<()>;

    /// Drops a table and every document in it. Missing tables are ignored.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    async fn drop_table(&self, table: &str) -> DocSyncResult<()>;

    /// Returns every document in `table` matching `filter`; an empty filter matches all.
    async fn query_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<Vec<Bson>>;

    /// Counts the documents in `table` matching `filter`.
    async fn count_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<u64>;

    /// Builds the actual schema from [`StoreBackend::list_tables`].
    async fn introspect(&self) -> DocSyncResult<Schema> {
        Ok(self.list_tables().await?.into_iter().collect())
    }

    /// Releases connections and other resources held by the backend.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocSyncResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend,
{
    async fn list_tables(&self) -> DocSyncResult<Vec<Table>> {
        (*self).list_tables().await
    }

    async fn create_index(&self, index: &Index) -> DocSyncResult<()> {
        (*self).create_index(index).await
    }

    async fn drop_index(&self, table: &str, index: &str) -> DocSyncResult<()> {
        (*self).drop_index(table, index).await
    }

    async fn drop_table(&self, table: &str) -> DocSyncResult<()> {
        (*self).drop_table(table).await
    }

    async fn query_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<Vec<Bson>> {
        (*self)
            .query_documents(table, filter)
            .await
    }

    async fn count_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<u64> {
        (*self)
            .count_documents(table, filter)
            .await
    }

    async fn introspect(&self) -> DocSyncResult<Schema> {
        (*self).introspect().await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocSyncResult<Self::Backend>;
}
