use ogm_metadata::MetadataError;
use ogm_types::{CoercionError, TypeError};

/// Errors from identity tracking.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// No wrapper type can be built for the type. Nothing is cached for it,
    /// so a later attempt with different metadata may succeed.
    #[error("cannot build identity wrapper for {type_name}: {reason}")]
    ProxyConstruction { type_name: String, reason: String },

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("identity coercion failed: {0}")]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
