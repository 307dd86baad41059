//! In-memory store backend for docsync.
//!
//! Provides a thread-safe implementation of the `StoreBackend` trait for
//! development and tests. Tables keep their indexes for introspection and
//! their documents for condition queries.
//!
//! # Quick Start
//!
//! ```ignore
//! use docsync::{config::SyncConfig, memory::InMemoryStore, schema::tool::SchemaTool};
//!
//! let backend = InMemoryStore::builder().build().await?;
//! let tool = SchemaTool::new(backend, &SyncConfig::new("memory://", "odm"))
//!     .register::<User>();
//!
//! tool.update_schema(false).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docsync_memory;

mod evaluator;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
