use async_trait::async_trait;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, IndexModel,
    error::{Error as MongoError, ErrorKind},
    options::{ClientOptions, IndexOptions},
};
use tracing::debug;

use docsync_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    config::SyncConfig,
    error::{DocSyncError, DocSyncResult},
    filter::{Filter, FilterVisitor},
    schema::model::{Index, Table},
};

use crate::filter::MongoFilterRenderer;

/// Name MongoDB gives the implicit `_id` index of every collection.
const IDENTITY_INDEX: &str = "_id_";

const NAMESPACE_NOT_FOUND: i32 = 26;
const INDEX_NOT_FOUND: i32 = 27;
/// Same name, different keys. Same keys under another name (85) is a real failure.
const INDEX_KEY_SPECS_CONFLICT: i32 = 86;

fn command_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

fn index_name_taken(code: Option<i32>) -> bool {
    code == Some(INDEX_KEY_SPECS_CONFLICT)
}

/// Converts a listed index, keeping its stored name. The identity index is skipped.
fn index_from_model(model: IndexModel) -> Option<Index> {
    let columns = model.keys.keys().cloned().collect::<Vec<_>>();

    match model.options.and_then(|options| options.name) {
        Some(name) if name == IDENTITY_INDEX => None,
        Some(name) => Some(Index::from_store(name, columns)),
        None => Some(Index::new(columns)),
    }
}

fn store_error(err: MongoError) -> DocSyncError {
    DocSyncError::store(err.to_string())
}

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(name)
    }

    async fn list_indexes(&self, table: &str) -> DocSyncResult<Vec<Index>> {
        Ok(
            self.get_collection(table)
                .list_indexes()
                .await
                .map_err(store_error)?
                .try_collect::<Vec<IndexModel>>()
                .await
                .map_err(store_error)?
                .into_iter()
                .filter_map(index_from_model)
                .collect()
        )
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn list_tables(&self) -> DocSyncResult<Vec<Table>> {
        let mut names = self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(store_error)?
            .into_iter()
            .filter(|name| !name.starts_with("system."))
            .collect::<Vec<_>>();
        names.sort();

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let table = self
                .list_indexes(&name)
                .await?
                .into_iter()
                .fold(Table::new(name.as_str()), |table, index| table.with_index(index));

            tables.push(table);
        }

        Ok(tables)
    }

    async fn create_index(&self, index: &Index) -> DocSyncResult<()> {
        let keys = index
            .columns()
            .iter()
            .map(|column| (column.clone(), Bson::Int32(1)))
            .collect::<Document>();

        let result = self.get_collection(index.table())
            .create_index(
                IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                    .name(index.name().to_string())
                    .build()
                )
                .build()
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if index_name_taken(command_code(&err)) => {
                debug!(table = index.table(), index = index.name(), error = %err, "index already exists");
                Ok(())
            }
            Err(err) => Err(store_error(err)),
        }
    }

    async fn drop_index(&self, table: &str, index: &str) -> DocSyncResult<()> {
        match self.get_collection(table).drop_index(index).await {
            Ok(_) => Ok(()),
            Err(err) if matches!(command_code(&err), Some(INDEX_NOT_FOUND | NAMESPACE_NOT_FOUND)) => {
                debug!(table, index, "index not found, nothing to drop");
                Ok(())
            }
            Err(err) => Err(store_error(err)),
        }
    }

    async fn drop_table(&self, table: &str) -> DocSyncResult<()> {
        match self.get_collection(table).drop().await {
            Ok(_) => Ok(()),
            Err(err) if command_code(&err) == Some(NAMESPACE_NOT_FOUND) => {
                debug!(table, "table not found, nothing to drop");
                Ok(())
            }
            Err(err) => Err(store_error(err)),
        }
    }

    async fn query_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<Vec<Bson>> {
        Ok(
            self.get_collection(table)
                .find(MongoFilterRenderer.visit_filter(filter)?)
                .await
                .map_err(store_error)?
                .try_collect::<Vec<Document>>()
                .await
                .map_err(store_error)?
                .into_iter()
                .map(Bson::Document)
                .collect()
        )
    }

    async fn count_documents(&self, table: &str, filter: &Filter) -> DocSyncResult<u64> {
        self.get_collection(table)
            .count_documents(MongoFilterRenderer.visit_filter(filter)?)
            .await
            .map_err(store_error)
    }

    async fn shutdown(self) -> DocSyncResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }

    /// Uses the endpoint and database of a validated configuration.
    pub fn from_config(config: &SyncConfig) -> DocSyncResult<Self> {
        config.validate()?;

        Ok(Self::new(&config.endpoint, &config.database))
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocSyncResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| DocSyncError::Initialization(e.to_string()))?,
            )
            .map_err(|e| DocSyncError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn model(name: &str, keys: Document) -> IndexModel {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build()
    }

    #[test]
    fn listed_index_keeps_its_stored_name() {
        let index = index_from_model(model("by-town", doc! { "hometown": 1, "age": 1 })).unwrap();

        assert_eq!(index.name(), "by-town");
        assert_eq!(index.columns(), ["hometown", "age"]);
    }

    #[test]
    fn identity_index_is_not_listed() {
        assert_eq!(index_from_model(model(IDENTITY_INDEX, doc! { "_id": 1 })), None);
    }

    #[test]
    fn only_a_name_conflict_counts_as_existing_index() {
        assert!(index_name_taken(Some(INDEX_KEY_SPECS_CONFLICT)));
        // same keys already indexed under another name
        assert!(!index_name_taken(Some(85)));
        assert!(!index_name_taken(Some(INDEX_NOT_FOUND)));
        assert!(!index_name_taken(None));
    }

    #[test]
    fn builder_takes_connection_from_config() {
        let config = SyncConfig::new("mongodb://db:27017", "odm-test");
        let builder = MongoDbStoreBuilder::from_config(&config).unwrap();

        assert_eq!(builder.dsn, "mongodb://db:27017");
        assert_eq!(builder.database, "odm-test");
    }

    #[test]
    fn builder_rejects_blank_database() {
        let config = SyncConfig::new("mongodb://db:27017", "");

        assert!(matches!(
            MongoDbStoreBuilder::from_config(&config),
            Err(DocSyncError::Configuration(_))
        ));
    }
}
