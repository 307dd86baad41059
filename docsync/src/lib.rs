//! Condition translation and schema synchronization for document stores.
//!
//! This crate is the entry point of the docsync project. It re-exports the
//! core types and the available store backends.
//!
//! - Translate placeholder condition expressions such as
//!   `#age BETWEEN :lo AND :hi` into typed, backend-neutral filters
//! - Diff the tables and indexes declared by entities against a live store
//! - Preview or apply the resulting changes
//!
//! # Quick Start
//!
//! ```ignore
//! use docsync::{prelude::*, memory::InMemoryStore};
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn definition() -> EntityDefinition {
//!         EntityDefinition::new("User", "users", KeyDefinition::hash("id"))
//!             .with_secondary_index("hometown-age", KeyDefinition::hash("hometown").with_range("age"))
//!             .with_attribute("id", AttributeType::Number)
//!             .with_attribute("age", AttributeType::Number)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> DocSyncResult<()> {
//!     let config = SyncConfig::new("memory://", "odm").with_table_prefix("odm-");
//!     let tool = SchemaTool::new(InMemoryStore::new(), &config).register::<User>();
//!
//!     // Will create table: odm-users
//!     // Will create index primary_key ON odm-users (id)
//!     // Will create index hometown_age ON odm-users (hometown,age)
//!     for line in tool.update_schema(true).await?.lines {
//!         println!("{line}");
//!     }
//!
//!     tool.update_schema(false).await?;
//!
//!     let adults = ConditionQuery::key_conditions("#age >= :age")
//!         .field("#age", "age")
//!         .param(":age", "18")
//!         .attribute_types(User::definition().attribute_types())
//!         .count(tool.backend(), "odm-users")
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory store for development and testing
//! - [`mongodb`] - MongoDB store (requires the `mongodb` feature)

pub mod prelude;

pub use docsync_core::{attribute, backend, condition, config, error, filter, query, schema};

// Re-export BSON types for convenience
pub use bson;

/// In-memory store backend.
pub mod memory {
    pub use docsync_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB store backend.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docsync_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
