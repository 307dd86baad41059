//! Condition translation and schema synchronization for document stores.
//!
//! This crate is the core of the docsync project and provides:
//!
//! - **Attribute types** ([`attribute`]) - Declared field types used to coerce condition values
//! - **Condition translator** ([`condition`]) - Placeholder-based condition expressions to filters
//! - **Filters** ([`filter`]) - Backend-neutral filters and the visitor backends consume them with
//! - **Condition queries** ([`query`]) - Translate-and-run helpers over a backend
//! - **Schema sync** ([`schema`]) - Schema model, entity metadata, diff, apply and schema commands
//! - **Store backend abstraction** ([`backend`]) - The capability set a live store must provide
//! - **Configuration** ([`config`]) - Connection settings, table prefix and entity definitions
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use docsync::{attribute::{AttributeType, AttributeTypes}, condition::translate};
//!
//! let fields = HashMap::from([("#age".to_string(), "age".to_string())]);
//! let params = HashMap::from([(":lo".to_string(), "10".to_string()), (":hi".to_string(), "20".to_string())]);
//! let types = AttributeTypes::new().with("age", AttributeType::Number);
//!
//! // {"age": {"gte": 10, "lte": 20}}
//! let filter = translate("#age BETWEEN :lo AND :hi", &fields, &params, &types)?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docsync_core;

pub mod attribute;
pub mod backend;
pub mod condition;
pub mod config;
pub mod error;
pub mod filter;
pub mod query;
pub mod schema;
