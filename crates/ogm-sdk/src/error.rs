use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
/// Errors surfaced by the mapper facade.
pub enum SdkError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("merge error: {0}")]
    Merge(#[from] ogm_merge::MergeError),

    #[error("identity error: {0}")]
    Identity(#[from] ogm_identity::IdentityError),

    #[error("metadata error: {0}")]
    Metadata(#[from] ogm_metadata::MetadataError),
}

pub type SdkResult<T> = Result<T, SdkError>;
