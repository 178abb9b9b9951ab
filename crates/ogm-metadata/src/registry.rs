use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ogm_types::Entity;
use tracing::debug;

use crate::class_info::ClassInfo;
use crate::error::{MetadataError, MetadataResult};

/// Metadata lookup contract consumed by the hydration core.
///
/// Implementations must be safe to share across threads; lookups happen on
/// every identity and merge operation.
pub trait MetadataLookup: Send + Sync {
    /// Class info for a type name.
    ///
    /// Returns [`MetadataError::UnknownType`] when the type is not mapped.
    fn class_info_by_name(&self, type_name: &str) -> MetadataResult<Arc<ClassInfo>>;

    /// Class info for an entity, looking through any stand-in.
    fn class_info(&self, entity: &dyn Entity) -> MetadataResult<Arc<ClassInfo>> {
        self.class_info_by_name(entity.target().type_name())
    }
}

/// In-memory metadata registry keyed by type name.
pub struct MetaData {
    classes: RwLock<HashMap<String, Arc<ClassInfo>>>,
}

impl MetaData {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> MetadataResult<RwLockReadGuard<'_, HashMap<String, Arc<ClassInfo>>>> {
        self.classes
            .read()
            .map_err(|e| MetadataError::Internal(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> MetadataResult<RwLockWriteGuard<'_, HashMap<String, Arc<ClassInfo>>>> {
        self.classes
            .write()
            .map_err(|e| MetadataError::Internal(format!("lock poisoned: {e}")))
    }

    /// Register (or replace) the class info for its type.
    pub fn register(&self, info: ClassInfo) -> MetadataResult<Arc<ClassInfo>> {
        let info = Arc::new(info);
        let mut classes = self.write()?;
        debug!(type_name = info.type_name(), "registered class info");
        classes.insert(info.type_name().to_string(), Arc::clone(&info));
        Ok(info)
    }

    /// Number of registered types.
    pub fn len(&self) -> MetadataResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> MetadataResult<bool> {
        Ok(self.read()?.is_empty())
    }
}

impl Default for MetaData {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataLookup for MetaData {
    fn class_info_by_name(&self, type_name: &str) -> MetadataResult<Arc<ClassInfo>> {
        self.read()?
            .get(type_name)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType(type_name.to_string()))
    }
}

impl std::fmt::Debug for MetaData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaData")
            .field("type_count", &self.len().ok())
            .finish()
    }
}
