//! MongoDB backend for docsync.
//!
//! Implements the `StoreBackend` trait on top of the official async driver.
//! Tables map to collections and indexes to named ascending collection
//! indexes; filters are rendered to native query documents.
//!
//! To use this backend, enable the `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! docsync = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docsync::{backend::StoreBackendBuilder, config::SyncConfig, mongodb::MongoDbStoreBuilder};
//!
//! let config = SyncConfig::from_file("docsync.toml")?;
//! let store = MongoDbStoreBuilder::from_config(&config)?.build().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docsync_mongodb;

mod filter;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
