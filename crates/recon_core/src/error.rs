use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::block::BlockId;
use crate::document::DocumentId;

/// Unified error type for recon operations
#[derive(Debug, Error)]
pub enum ReconError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read key '{key}': {source}")]
    StorageRead {
        key: String,
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}': {source}")]
    StorageWrite {
        key: String,
        source: std::io::Error,
    },

    #[error("Failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Config errors
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    // Store errors
    #[error("Cannot close '{0}': at least one document must remain")]
    LastDocument(DocumentId),

    #[error("Invalid link title '{0}': must be non-empty without '[' or ']'")]
    InvalidLinkTitle(String),

    #[error("Document not found: '{0}'")]
    DocumentNotFound(DocumentId),

    #[error("Block '{block}' not found in document '{document}'")]
    BlockNotFound {
        document: DocumentId,
        block: BlockId,
    },

    #[error("No document titled '{0}'")]
    TitleNotFound(String),
}

/// Result type alias for recon operations
pub type Result<T> = std::result::Result<T, ReconError>;

/// A serializable representation of ReconError for IPC (e.g., a WASM host)
#[derive(Debug, Clone, Serialize)]
pub struct SerializableError {
    /// Error kind/variant name
    pub kind: String,
    /// Human-readable error message
    pub message: String,
    /// Associated storage key (if applicable)
    pub key: Option<String>,
    /// Associated path (if applicable)
    pub path: Option<PathBuf>,
}

impl From<&ReconError> for SerializableError {
    fn from(err: &ReconError) -> Self {
        let kind = match err {
            ReconError::Io(_) => "Io",
            ReconError::StorageRead { .. } => "StorageRead",
            ReconError::StorageWrite { .. } => "StorageWrite",
            ReconError::ConfigRead { .. } => "ConfigRead",
            ReconError::Json(_) => "Json",
            ReconError::ConfigParse(_) => "ConfigParse",
            ReconError::ConfigSerialize(_) => "ConfigSerialize",
            ReconError::NoConfigDir => "NoConfigDir",
            ReconError::LastDocument(_) => "LastDocument",
            ReconError::InvalidLinkTitle(_) => "InvalidLinkTitle",
            ReconError::DocumentNotFound(_) => "DocumentNotFound",
            ReconError::BlockNotFound { .. } => "BlockNotFound",
            ReconError::TitleNotFound(_) => "TitleNotFound",
        }
        .to_string();

        let key = match err {
            ReconError::StorageRead { key, .. } => Some(key.clone()),
            ReconError::StorageWrite { key, .. } => Some(key.clone()),
            _ => None,
        };

        let path = match err {
            ReconError::ConfigRead { path, .. } => Some(path.clone()),
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
            key,
            path,
        }
    }
}

impl From<ReconError> for SerializableError {
    fn from(err: ReconError) -> Self {
        SerializableError::from(&err)
    }
}

impl ReconError {
    /// Convert to a serializable representation for IPC
    pub fn to_serializable(&self) -> SerializableError {
        SerializableError::from(self)
    }
}
