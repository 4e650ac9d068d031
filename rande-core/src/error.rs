//! Error types for the rande ecosystem.

use thiserror::Error;

use crate::collection::Collection;
use crate::record::RecordId;

/// Errors that can occur in rande operations.
#[derive(Error, Debug)]
pub enum RandeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote write failed for '{collection}': {message}")]
    RemoteWrite {
        collection: Collection,
        message: String,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Attachment is {0} bytes, over the 10 MiB limit")]
    AttachmentTooLarge(u64),

    #[error("No researcher selected. Select one with: rande researcher select <id>")]
    NoResearcherSelected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for rande operations.
pub type RandeResult<T> = Result<T, RandeError>;
