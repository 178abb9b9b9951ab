use ogm_types::CoercionError;

/// Errors from metadata lookup and accessor use.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// No class info is registered for the type.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// A type declared more than one identity field.
    #[error("type {type_name} declares more than one identity field: {fields:?}")]
    DuplicateIdentityField {
        type_name: String,
        fields: Vec<String>,
    },

    /// The type has no identity field and the entity is not wrapped.
    #[error("type {0} declares no identity field")]
    NoIdentityField(String),

    #[error("type {type_name} has no field named {field}")]
    UnknownField { type_name: String, field: String },

    #[error("field {type_name}.{field} is read-only")]
    ReadOnlyField { type_name: String, field: String },

    /// An accessor was applied to an entity of another concrete type.
    #[error("accessor for {expected} applied to {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("coercion failed: {0}")]
    Coercion(#[from] CoercionError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;
