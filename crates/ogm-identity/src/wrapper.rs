//! The transparent identity wrapper.
//!
//! Domain types without an identity field cannot hold the store identity
//! themselves. An [`EntityWrapper`] stands in for such an object: it owns a
//! handle to the wrapped object plus one identity slot, and implements
//! [`Entity`] by delegating every capability to the wrapped object. Accessor
//! tables see through it (see [`Entity::wrapped`]), so reads and writes of
//! the object's own fields are unaffected.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use ogm_metadata::ClassInfo;
use ogm_types::{Entity, EntityId, EntityRef};
use tracing::warn;

use crate::error::{IdentityError, IdentityResult};

const UNASSIGNED: i64 = -1;

/// Out-of-band identity storage for one wrapped object.
///
/// Clones share the same cell. The tracker keeps one slot per wrapped
/// object for as long as that object lives, and every wrapper created for
/// the object writes through it.
#[derive(Clone)]
pub struct IdentitySlot(Arc<AtomicI64>);

impl IdentitySlot {
    /// An unassigned slot.
    pub fn new() -> Self {
        Self(Arc::new(AtomicI64::new(UNASSIGNED)))
    }

    /// The assigned identity, if any.
    pub fn get(&self) -> Option<EntityId> {
        EntityId::new(self.0.load(AtomicOrdering::Acquire)).ok()
    }

    /// Store `id`, returning the identity previously held.
    pub fn set(&self, id: EntityId) -> Option<EntityId> {
        EntityId::new(self.0.swap(id.get(), AtomicOrdering::AcqRel)).ok()
    }

    /// Store `id` for an object of `type_name`. Replacing a different
    /// identity is allowed but logged.
    pub(crate) fn assign(&self, type_name: &str, id: EntityId) {
        if let Some(previous) = self.set(id).filter(|p| *p != id) {
            warn!(
                type_name,
                previous = previous.get(),
                id = id.get(),
                "store identity reassigned"
            );
        }
    }

    /// Returns `true` if both handles refer to the same cell.
    pub fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for IdentitySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentitySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IdentitySlot").field(&self.get()).finish()
    }
}

/// Per-type wrapper descriptor, built once per concrete type and shared by
/// every wrapper of that type.
#[derive(Debug)]
pub struct WrapperType {
    target_type: String,
    name: String,
}

impl WrapperType {
    /// Build the wrapper descriptor for a mapped type.
    ///
    /// Fails with [`IdentityError::ProxyConstruction`] when the type is
    /// sealed or already declares its own identity field.
    pub fn build(info: &ClassInfo) -> IdentityResult<Self> {
        let reason = if !info.is_wrappable() {
            Some("type is sealed")
        } else if info.has_identity_field() {
            Some("type declares its own identity field")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(IdentityError::ProxyConstruction {
                type_name: info.type_name().to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(Self {
            target_type: info.type_name().to_string(),
            name: format!("{}$IdentityWrapper", info.type_name()),
        })
    }

    /// The wrapped type's name.
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Name of the wrapper type, `<Type>$IdentityWrapper`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Stand-in carrying a store identity for an object whose type has no
/// identity field.
pub struct EntityWrapper {
    inner: EntityRef,
    wrapper_type: Arc<WrapperType>,
    slot: IdentitySlot,
}

impl EntityWrapper {
    pub(crate) fn new(
        inner: EntityRef,
        wrapper_type: Arc<WrapperType>,
        slot: IdentitySlot,
    ) -> Self {
        Self {
            inner,
            wrapper_type,
            slot,
        }
    }

    /// The wrapped object.
    pub fn inner(&self) -> &EntityRef {
        &self.inner
    }

    /// The cached descriptor of the wrapped type.
    pub fn wrapper_type(&self) -> &Arc<WrapperType> {
        &self.wrapper_type
    }

    /// The identity slot shared with the tracker.
    pub fn slot(&self) -> &IdentitySlot {
        &self.slot
    }

    /// The tracked store identity, if one has been assigned.
    pub fn native_id(&self) -> Option<EntityId> {
        self.slot.get()
    }

    /// Record the store identity. Replacing a different identity is allowed
    /// but logged.
    pub fn set_native_id(&self, id: EntityId) {
        self.slot.assign(self.inner.type_name(), id);
    }
}

/// The wrapper behind `entity`, if `entity` is one.
pub fn as_wrapper(entity: &dyn Entity) -> Option<&EntityWrapper> {
    entity.as_any().downcast_ref::<EntityWrapper>()
}

impl Entity for EntityWrapper {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn wrapped(&self) -> Option<&dyn Entity> {
        Some(&*self.inner)
    }

    fn equals(&self, other: &dyn Entity) -> Option<bool> {
        self.inner.equals(other)
    }

    fn hash_code(&self) -> Option<u64> {
        self.inner.hash_code()
    }

    fn compare(&self, other: &dyn Entity) -> Option<Ordering> {
        self.inner.compare(other)
    }
}

impl fmt::Debug for EntityWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
