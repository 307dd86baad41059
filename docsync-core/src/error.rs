//! Error types and result types for condition translation and schema synchronization.
//!
//! Every fallible operation in the workspace returns [`DocSyncResult<T>`].

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors raised by the translator, the schema engine and store backends.
#[derive(Error, Debug)]
pub enum DocSyncError {
    /// A condition expression, attribute declaration, change code or entity definition is malformed.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The underlying store rejected an introspection, query or schema operation.
    #[error("Store operation error: {0}")]
    StoreOperation(String),
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A schema apply stopped at the first failing change.
    ///
    /// `applied` holds the description lines of the changes that succeeded before
    /// the failure. Those changes are left in place.
    #[error("Schema apply halted after {} change(s): {source}", .applied.len())]
    ApplyHalted {
        applied: Vec<String>,
        #[source]
        source: Box<DocSyncError>,
    },
}

impl DocSyncError {
    pub fn validation(message: impl Into<String>) -> Self {
        DocSyncError::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        DocSyncError::StoreOperation(message.into())
    }
}

/// A specialized `Result` type for docsync operations.
pub type DocSyncResult<T> = Result<T, DocSyncError>;

impl From<BsonError> for DocSyncError {
    fn from(err: BsonError) -> Self {
        DocSyncError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocSyncError {
    fn from(err: SerdeJsonError) -> Self {
        DocSyncError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DocSyncError {
    fn from(err: toml::de::Error) -> Self {
        DocSyncError::Configuration(err.to_string())
    }
}
