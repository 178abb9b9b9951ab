use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Identity tracking settings, read from the `[identity]` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Maximum number of wrapper types kept resident.
    pub wrapper_cache_capacity: usize,
}

impl IdentityConfig {
    /// Wrapper types cached when no capacity is configured.
    pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// The configured capacity, or `None` when it is zero.
    pub fn cache_capacity(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.wrapper_cache_capacity)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            wrapper_cache_capacity: Self::DEFAULT_CAPACITY.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.wrapper_cache_capacity, 256);
        assert_eq!(config.cache_capacity(), Some(IdentityConfig::DEFAULT_CAPACITY));
    }

    #[test]
    fn zero_capacity_has_no_cache_capacity() {
        let config = IdentityConfig {
            wrapper_cache_capacity: 0,
        };
        assert_eq!(config.cache_capacity(), None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: IdentityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, IdentityConfig::default());

        let config: IdentityConfig =
            serde_json::from_str(r#"{"wrapper_cache_capacity": 16}"#).unwrap();
        assert_eq!(config.wrapper_cache_capacity, 16);
    }
}
