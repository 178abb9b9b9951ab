use std::fmt;
use std::sync::Arc;

use ogm_metadata::{Coercion, DefaultCoercion, MetadataError, MetadataLookup};
use ogm_types::{placeholder_from_address, ElementType, Entity, EntityId, EntityRef, Value};
use tracing::debug;

use crate::cache::WrapperTypeCache;
use crate::config::IdentityConfig;
use crate::error::IdentityResult;
use crate::registry::InstanceRegistry;
use crate::wrapper::{as_wrapper, EntityWrapper, IdentitySlot, WrapperType};

/// Reads, assigns and tracks store identities of domain objects.
///
/// Objects whose type declares an identity field keep their identity in that
/// field. All other objects get it through an [`EntityWrapper`], obtained
/// from [`IdentityTracker::wrap`]. The tracker keeps the identity slot of
/// each wrapped object for as long as the object lives, so identity lookups
/// work on the plain object too, and a later wrapper of the same object
/// sees the identity assigned through an earlier one.
pub struct IdentityTracker {
    cache: Arc<WrapperTypeCache>,
    instances: InstanceRegistry,
    coercion: Arc<dyn Coercion>,
}

impl IdentityTracker {
    /// Tracker with a private default-sized wrapper-type cache.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(WrapperTypeCache::default()))
    }

    /// Tracker sharing an existing wrapper-type cache.
    pub fn with_cache(cache: Arc<WrapperTypeCache>) -> Self {
        Self {
            cache,
            instances: InstanceRegistry::default(),
            coercion: Arc::new(DefaultCoercion),
        }
    }

    /// Tracker with a private cache sized from `config`.
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::with_cache(Arc::new(WrapperTypeCache::from_config(config)))
    }

    /// Replace the coercion used to convert identity field values.
    pub fn with_coercion(mut self, coercion: Arc<dyn Coercion>) -> Self {
        self.coercion = coercion;
        self
    }

    /// The wrapper-type cache in use.
    pub fn cache(&self) -> &Arc<WrapperTypeCache> {
        &self.cache
    }

    /// The store identity of `entity`, or a negative placeholder when it has
    /// none yet.
    pub fn identity_or_placeholder(
        &self,
        entity: &dyn Entity,
        metadata: &dyn MetadataLookup,
    ) -> IdentityResult<i64> {
        Ok(self
            .store_identity(entity, metadata)?
            .map_or_else(|| placeholder(entity), EntityId::get))
    }

    /// The store identity of `entity`, if it has one.
    pub fn store_identity(
        &self,
        entity: &dyn Entity,
        metadata: &dyn MetadataLookup,
    ) -> IdentityResult<Option<EntityId>> {
        if let Some(slot) = self.slot_of(entity) {
            return Ok(slot.get());
        }
        let info = metadata.class_info(entity)?;
        let Some(field) = info.identity_field() else {
            return Ok(None);
        };
        let value = field.read(entity)?;
        if value.is_null() {
            return Ok(None);
        }
        match self.coercion.coerce(&ElementType::Long, value)? {
            Value::Long(raw) => Ok(Some(EntityId::new(raw)?)),
            Value::Null => Ok(None),
            other => Err(MetadataError::TypeMismatch {
                expected: ElementType::Long.to_string(),
                actual: other.kind().to_string(),
            }
            .into()),
        }
    }

    /// Record `id` as the store identity of `entity`.
    ///
    /// Wrapped objects, and objects that have been wrapped before, store it
    /// in their identity slot. Everything else must declare an identity
    /// field.
    pub fn assign_identity(
        &self,
        entity: &dyn Entity,
        metadata: &dyn MetadataLookup,
        id: EntityId,
    ) -> IdentityResult<()> {
        if let Some(slot) = self.slot_of(entity) {
            slot.assign(entity.type_name(), id);
            debug!(type_name = entity.type_name(), id = %id, "identity stored in slot");
            return Ok(());
        }
        let info = metadata.class_info(entity)?;
        let field = info
            .identity_field()
            .ok_or_else(|| MetadataError::NoIdentityField(info.type_name().to_string()))?;
        let value = self
            .coercion
            .coerce(field.element_type(), Value::Long(id.get()))?;
        field.write(entity, value)?;
        debug!(type_name = info.type_name(), field = field.name(), id = %id, "identity assigned");
        Ok(())
    }

    /// Return a handle able to carry a store identity for `entity`.
    ///
    /// Wrappers and objects with their own identity field are returned as
    /// they are. Any other object is wrapped. Wrapping the same object again
    /// yields the same wrapper while it is alive, and a wrapper sharing the
    /// same identity slot after that.
    pub fn wrap(
        &self,
        entity: &EntityRef,
        metadata: &dyn MetadataLookup,
    ) -> IdentityResult<EntityRef> {
        if as_wrapper(&**entity).is_some() {
            return Ok(entity.clone());
        }
        let info = metadata.class_info(&**entity)?;
        if info.has_identity_field() {
            return Ok(entity.clone());
        }

        if let Some(existing) = self.instances.live_wrapper(entity.address()) {
            return Ok(EntityRef::from(existing));
        }

        let wrapper_type = self
            .cache
            .find_or_insert(info.type_name(), || WrapperType::build(&info))?;
        let wrapper = self.instances.wrapper_for(entity, |slot| {
            EntityWrapper::new(entity.clone(), wrapper_type, slot)
        });
        debug!(
            type_name = info.type_name(),
            wrapper = wrapper.wrapper_type().name(),
            "entity wrapped"
        );
        Ok(EntityRef::from(wrapper))
    }

    /// Number of wrapped objects currently tracked, live or not yet pruned.
    pub fn tracked_objects(&self) -> usize {
        self.instances.len()
    }

    fn slot_of(&self, entity: &dyn Entity) -> Option<IdentitySlot> {
        match as_wrapper(entity) {
            Some(wrapper) => Some(wrapper.slot().clone()),
            None => self.instances.slot(entity.address()),
        }
    }
}

/// Process-local placeholder identity for `entity`: strictly negative, and
/// the same for a wrapper and the object it wraps.
pub fn placeholder(entity: &dyn Entity) -> i64 {
    placeholder_from_address(entity.address())
}

impl Default for IdentityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTracker")
            .field("cache", &self.cache)
            .field("tracked_objects", &self.tracked_objects())
            .finish()
    }
}
