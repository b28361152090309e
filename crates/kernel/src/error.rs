//! Content store error types.

use palika_sdk::NodeId;
use thiserror::Error;

/// Errors returned by [`ContentStore`](crate::content::ContentStore) operations.
///
/// A failed operation leaves the document exactly as it was.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error(
        "new order is not a permutation of the current nodes \
         (duplicates: {duplicates:?}, missing: {missing:?}, unknown: {unknown:?})"
    )]
    InvalidPermutation {
        duplicates: Vec<NodeId>,
        missing: Vec<NodeId>,
        unknown: Vec<NodeId>,
    },

    #[error("{owner} references unknown node(s): {missing:?}")]
    UnknownReference { owner: String, missing: Vec<NodeId> },

    #[error("field '{0}' cannot be changed")]
    ImmutableField(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("node {0} is not a section")]
    NotASection(NodeId),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Short machine-readable code, used in CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidPermutation { .. } => "invalid_permutation",
            StoreError::UnknownReference { .. } => "unknown_reference",
            StoreError::ImmutableField(_) => "immutable_field",
            StoreError::InvalidUpdate(_) => "invalid_update",
            StoreError::NotASection(_) => "not_a_section",
            StoreError::Serialization(_) => "serialization",
        }
    }
}

/// A batch of actions failed; nothing from the batch was applied.
#[derive(Debug, Error)]
#[error("action {index} failed: {source}")]
pub struct BatchError {
    /// Zero-based position of the failing action.
    pub index: usize,
    #[source]
    pub source: StoreError,
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
