use std::path::Path;

use ogm_identity::IdentityConfig;
use ogm_merge::MergeOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Mapper configuration.
///
/// ```toml
/// [identity]
/// wrapper_cache_capacity = 256
///
/// [merge]
/// list_merge = "deduplicate"
/// ```
///
/// Every table and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OgmConfig {
    pub identity: IdentityConfig,
    pub merge: MergeOptions,
}

impl OgmConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), "loaded mapper config");
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.cache_capacity().is_none() {
            return Err(ConfigError::Invalid(
                "identity.wrapper_cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
