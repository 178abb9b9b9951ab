//! Capability interface of domain objects.
//!
//! The mapper never reflects over domain types. Instead every mapped type
//! implements [`Entity`], which exposes the handful of capabilities the core
//! needs: a type key for metadata lookup, downcasting for the registered
//! accessor tables, and optional value semantics (equality, hashing,
//! ordering). String form is the type's `Debug` output.
//!
//! Stand-ins such as the identity wrapper implement [`Entity`] by delegation
//! and report the object they stand for through [`Entity::wrapped`]. All
//! comparisons in this module look through stand-ins to the wrapped target.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A mapped domain object.
pub trait Entity: Any + Send + Sync + fmt::Debug {
    /// Concrete type name. This is the key used for metadata lookup and for
    /// the wrapper-type cache.
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// The object this value stands in for, if it is a stand-in.
    fn wrapped(&self) -> Option<&dyn Entity> {
        None
    }

    /// Domain equality. `None` means the type has no value equality and
    /// instances compare by identity.
    ///
    /// Types that return `Some` here must also implement [`Entity::hash_code`].
    fn equals(&self, _other: &dyn Entity) -> Option<bool> {
        None
    }

    /// Domain hash, consistent with [`Entity::equals`].
    fn hash_code(&self) -> Option<u64> {
        None
    }

    /// Domain ordering, used when entities are held in sorted sets.
    fn compare(&self, _other: &dyn Entity) -> Option<Ordering> {
        None
    }
}

impl<'a> dyn Entity + 'a {
    /// The innermost wrapped object (or `self` when not a stand-in).
    pub fn target(&self) -> &dyn Entity {
        let mut current: &dyn Entity = self;
        while let Some(inner) = current.wrapped() {
            current = inner;
        }
        current
    }

    /// Memory address of the target object. Stable while the object lives.
    pub fn address(&self) -> usize {
        self.target() as *const dyn Entity as *const () as usize
    }

    /// Downcast the target object to a concrete domain type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.target().as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the target object is a `T`.
    pub fn is<T: Entity>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

/// Shared handle to a domain object.
///
/// Equality, hashing, and ordering forward to the target object's own
/// capabilities and fall back to object identity when the type declares
/// none. A stand-in therefore compares equal to the object it wraps.
#[derive(Clone)]
pub struct EntityRef(Arc<dyn Entity>);

impl EntityRef {
    /// Wrap a domain object in a shared handle.
    pub fn new<T: Entity>(entity: T) -> Self {
        Self(Arc::new(entity))
    }

    /// The shared pointer behind this handle.
    pub fn as_arc(&self) -> &Arc<dyn Entity> {
        &self.0
    }

    /// Returns `true` if both handles point at the same allocation.
    ///
    /// Unlike `==`, a stand-in and the object it wraps are not `ptr_eq`.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for EntityRef {
    type Target = dyn Entity;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<T: Entity> From<Arc<T>> for EntityRef {
    fn from(entity: Arc<T>) -> Self {
        Self(entity)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.target(), f)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.0.target(), other.0.target());
        if a.address() == b.address() {
            return true;
        }
        a.equals(b).unwrap_or(false)
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let target = self.0.target();
        match target.hash_code() {
            Some(code) => code.hash(state),
            None => target.address().hash(state),
        }
    }
}

impl PartialOrd for EntityRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityRef {
    /// Equal entities compare `Equal`; otherwise the domain ordering is used,
    /// falling back to type name and then address.
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        let (a, b) = (self.0.target(), other.0.target());
        a.compare(b)
            .unwrap_or_else(|| {
                a.type_name()
                    .cmp(b.type_name())
                    .then_with(|| a.address().cmp(&b.address()))
            })
    }
}
