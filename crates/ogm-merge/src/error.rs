use ogm_types::{CoercionError, ContainerShape};

/// Errors from collection reconciliation.
///
/// Both variants are deterministic for a given input; callers should not
/// retry a failed merge without changing the mapping or the data.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The target shape cannot be materialized. This is a mapping-metadata
    /// bug, not a data error.
    #[error("unsupported container kind: {0}")]
    UnsupportedContainerKind(String),

    /// An element could not be converted to the declared element type. No
    /// partial result is produced.
    #[error("coercion failure: {0}")]
    CoercionFailure(#[from] CoercionError),
}

impl MergeError {
    pub(crate) fn unsupported(shape: ContainerShape) -> Self {
        Self::UnsupportedContainerKind(shape.name().to_string())
    }
}

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
