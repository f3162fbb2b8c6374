//! Error kinds surfaced by the export pipeline.
//!
//! Every stage returns [`Result`]; nothing is retried internally, the caller
//! decides what to do with a failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Neither an explicit mapping document nor a connection string was given.
    #[error("Must specify either a connection string or a mapping file: {0}")]
    MissingMappingSource(String),

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// The mapping document is structurally broken (dangling references, bridges without a value).
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("No suitable driver found for {0}")]
    DriverNotFound(String),

    #[error("Database connection failed: {0}")]
    Connectivity(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to serialize RDF: {0}")]
    Serialization(String),

    #[error("Failed to load ontology: {0}")]
    OntologyLoad(String),

    #[error("Failed to store ontology: {0}")]
    OntologyStorage(String),

    #[error("Settings document error: {0}")]
    Settings(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransformError {
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        TransformError::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for the parameter-validation family (raised before any I/O).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TransformError::MissingMappingSource(_)
                | TransformError::InvalidParameter { .. }
                | TransformError::InvalidMapping(_)
        )
    }

    /// True for driver, connection and query failures.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            TransformError::DriverNotFound(_)
                | TransformError::Connectivity(_)
                | TransformError::Query(_)
        )
    }
}

impl From<rusqlite::Error> for TransformError {
    fn from(err: rusqlite::Error) -> Self {
        TransformError::Query(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
