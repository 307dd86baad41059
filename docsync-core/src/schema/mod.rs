//! Schema synchronization between entity metadata and a live store.
//!
//! - [`model`] - tables, indexes, change records
//! - [`entity`] - entity metadata and the desired schema built from it
//! - [`diff`] - desired-versus-actual comparison
//! - [`apply`] - change execution and dry-run rendering
//! - [`tool`] - create / update / drop commands

pub mod apply;
pub mod diff;
pub mod entity;
pub mod model;
pub mod tool;
