//! Convenient re-exports of the most used docsync types.
//!
//! ```ignore
//! use docsync::prelude::*;
//! ```

pub use docsync_core::{
    attribute::{AttributeType, AttributeTypes},
    backend::{StoreBackend, StoreBackendBuilder},
    condition::{ConditionTranslator, translate},
    config::SyncConfig,
    error::{DocSyncError, DocSyncResult},
    filter::{CompareOp, Condition, Filter, FilterVisitor},
    query::{ConditionQuery, QueryKind},
    schema::{
        apply::{ApplyReport, ChangeApplier},
        diff::{diff, diff_table},
        entity::{Entity, EntityDefinition, KeyDefinition},
        model::{Change, ChangeType, Index, Schema, SchemaItem, Table},
        tool::SchemaTool,
    },
};
