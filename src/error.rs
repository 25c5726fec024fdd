use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by artifact collections
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid artifact name: {0}")]
    InvalidName(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    #[error("Cannot delete critical configuration file: {0}")]
    Protected(String),

    #[error("Validation failed for {name}: {}", .errors.join("; "))]
    ValidationFailed { name: String, errors: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage failure on {}: {source}", .path.display())]
    StorageFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::StorageFailure {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable identifier for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidName(_) => "InvalidName",
            StoreError::NotFound(_) => "NotFound",
            StoreError::AlreadyExists(_) => "AlreadyExists",
            StoreError::Protected(_) => "Protected",
            StoreError::ValidationFailed { .. } => "ValidationFailed",
            StoreError::InvalidInput(_) => "InvalidInput",
            StoreError::StorageFailure { .. } => "StorageFailure",
        }
    }

    /// Whether the failure was caused by the caller rather than the storage layer
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::StorageFailure { .. })
    }

    /// Validation messages carried by the error, if any
    pub fn details(&self) -> &[String] {
        match self {
            StoreError::ValidationFailed { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid directory for {var}: {value:?}")]
    InvalidDirectory { var: &'static str, value: String },

    #[error("Invalid protected file name: {0:?}")]
    InvalidProtectedFile(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
