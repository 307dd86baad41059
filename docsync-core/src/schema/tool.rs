//! High-level schema commands: create, update and drop.
//!
//! # Example
//!
//! ```ignore
//! use docsync::{config::SyncConfig, memory::InMemoryStore, schema::tool::SchemaTool};
//!
//! let config = SyncConfig::from_file("docsync.toml")?;
//! let tool = SchemaTool::new(InMemoryStore::new(), &config).register::<User>();
//!
//! for line in tool.update_schema(true).await?.lines {
//!     println!("{line}");
//! }
//! ```

use tracing::{info, warn};

use crate::{
    backend::StoreBackend,
    config::SyncConfig,
    error::DocSyncResult,
    schema::{
        apply::{ApplyReport, ChangeApplier},
        diff::diff,
        entity::{Entity, EntityDefinition, desired_schema},
        model::{Change, ChangeType, Schema},
    },
};

pub const DROP_REFUSED_LINE: &str = "Table drop command only available in develop environment.";

/// Reconciles the tables of a store with a set of entity definitions.
///
/// The desired schema is rebuilt from the entity definitions and the actual
/// schema is introspected from the store on every command.
#[derive(Debug)]
pub struct SchemaTool<B: StoreBackend> {
    backend: B,
    entities: Vec<EntityDefinition>,
    table_prefix: String,
    debug: bool,
}

impl<B: StoreBackend> SchemaTool<B> {
    /// Creates a tool using the prefix, debug flag and entities of `config`.
    pub fn new(backend: B, config: &SyncConfig) -> Self {
        Self {
            backend,
            entities: config.entities.clone(),
            table_prefix: config.table_prefix.clone(),
            debug: config.debug,
        }
    }

    pub fn with_entity(mut self, entity: EntityDefinition) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_entities(mut self, entities: impl IntoIterator<Item = EntityDefinition>) -> Self {
        self.entities.extend(entities);
        self
    }

    pub fn register<E: Entity>(self) -> Self {
        self.with_entity(E::definition())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn entities(&self) -> &[EntityDefinition] {
        &self.entities
    }

    pub fn desired_schema(&self) -> DocSyncResult<Schema> {
        desired_schema(&self.entities, &self.table_prefix)
    }

    /// Computes the changes a create or update would apply.
    ///
    /// With `skip_existing`, only changes for tables missing from the store
    /// are kept: existing tables are neither altered nor dropped.
    pub async fn plan(&self, skip_existing: bool) -> DocSyncResult<Vec<Change>> {
        let desired = self.desired_schema()?;
        let actual = self.backend.introspect().await?;
        let changes = diff(&desired, &actual);

        info!(
            desired_tables = desired.len(),
            actual_tables = actual.len(),
            changes = changes.len(),
            "computed schema changes"
        );

        if !skip_existing {
            return Ok(changes);
        }

        Ok(changes
            .into_iter()
            .filter(|change| !actual.contains(change.item().table_name()))
            .collect())
    }

    pub async fn create_schema(&self, skip_existing: bool, dry_run: bool) -> DocSyncResult<ApplyReport> {
        let changes = self.plan(skip_existing).await?;
        ChangeApplier::new(&self.backend)
            .apply(&changes, dry_run)
            .await
    }

    pub async fn update_schema(&self, dry_run: bool) -> DocSyncResult<ApplyReport> {
        self.create_schema(false, dry_run).await
    }

    /// Drops every table in the store, entity-managed or not.
    ///
    /// Only runs when the configuration enables `debug`; otherwise the report
    /// holds [`DROP_REFUSED_LINE`] and the store is left untouched.
    pub async fn drop_schema(&self) -> DocSyncResult<ApplyReport> {
        if !self.debug {
            warn!("refusing to drop schema outside debug mode");
            return Ok(ApplyReport {
                dry_run: false,
                lines: vec![DROP_REFUSED_LINE.to_string()],
                applied: 0,
            });
        }

        let changes = self
            .backend
            .list_tables()
            .await?
            .into_iter()
            .map(|table| Change::table(table, ChangeType::ToDelete))
            .collect::<Vec<_>>();

        ChangeApplier::new(&self.backend)
            .apply(&changes, false)
            .await
    }
}
