use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid store identity {0}: store identities are non-negative")]
    InvalidIdentity(i64),

    #[error("unsupported container kind: {0}")]
    UnsupportedContainerKind(String),
}

/// A value could not be converted to the declared element type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot coerce {value} to {target}: {reason}")]
pub struct CoercionError {
    /// Name of the declared target type.
    pub target: String,
    /// Rendered form of the offending value.
    pub value: String,
    pub reason: String,
}

impl CoercionError {
    /// Failure converting `value` to `target`.
    pub fn new(
        target: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
