//! Identity slots and live wrappers, keyed by the address of the wrapped
//! object.
//!
//! An entry lives as long as the wrapped object does, independent of any
//! wrapper handle. Entries hold weak references only, so the registry never
//! keeps an object (or a wrapper) alive. The weak target reference pins the
//! allocation, so an address cannot be reused while its entry exists. Entries
//! whose object has died are pruned as the map grows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ogm_types::{Entity, EntityRef};
use tracing::trace;

use crate::wrapper::{EntityWrapper, IdentitySlot};

const PRUNE_FLOOR: usize = 64;

#[derive(Debug, Default)]
pub(crate) struct InstanceRegistry {
    inner: Mutex<Instances>,
}

#[derive(Debug, Default)]
struct Instances {
    entries: HashMap<usize, Tracked>,
    prune_at: usize,
}

#[derive(Debug)]
struct Tracked {
    target: Weak<dyn Entity>,
    slot: IdentitySlot,
    wrapper: Weak<EntityWrapper>,
}

impl Tracked {
    fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl Instances {
    fn live(&self, address: usize) -> Option<&Tracked> {
        self.entries.get(&address).filter(|t| t.is_live())
    }

    fn prune(&mut self) {
        if self.entries.len() < self.prune_at.max(PRUNE_FLOOR) {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, t| t.is_live());
        let after = self.entries.len();
        self.prune_at = after * 2;
        trace!(before, after, "pruned dead identity entries");
    }
}

impl InstanceRegistry {
    fn lock(&self) -> MutexGuard<'_, Instances> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The identity slot of the live object at `address`, if it was ever
    /// wrapped.
    pub(crate) fn slot(&self, address: usize) -> Option<IdentitySlot> {
        self.lock().live(address).map(|t| t.slot.clone())
    }

    /// The live wrapper around the object at `address`, if any.
    pub(crate) fn live_wrapper(&self, address: usize) -> Option<Arc<EntityWrapper>> {
        self.lock().live(address).and_then(|t| t.wrapper.upgrade())
    }

    /// The wrapper registered for `target`, creating one with `build` when
    /// no wrapper is alive.
    ///
    /// `build` receives the object's identity slot: the existing one if the
    /// object was wrapped before, a fresh one otherwise. It runs under the
    /// registry lock, so concurrent callers agree on one wrapper.
    pub(crate) fn wrapper_for(
        &self,
        target: &EntityRef,
        build: impl FnOnce(IdentitySlot) -> EntityWrapper,
    ) -> Arc<EntityWrapper> {
        let address = target.address();
        let mut instances = self.lock();
        let slot = match instances.live(address) {
            Some(tracked) => {
                if let Some(wrapper) = tracked.wrapper.upgrade() {
                    return wrapper;
                }
                tracked.slot.clone()
            }
            None => IdentitySlot::new(),
        };
        let wrapper = Arc::new(build(slot.clone()));
        instances.entries.insert(
            address,
            Tracked {
                target: Arc::downgrade(target.as_arc()),
                slot,
                wrapper: Arc::downgrade(&wrapper),
            },
        );
        instances.prune();
        wrapper
    }

    /// Number of entries held, live or not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }
}
