use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Store-native identity of a persisted domain object.
///
/// An `EntityId` is assigned once by the store when the object is first saved
/// and never changes afterwards. Store identities are always non-negative;
/// negative numbers are reserved for process-local placeholders (see
/// [`placeholder_from_address`]), so the two can never collide.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct EntityId(i64);

impl EntityId {
    /// Create an identity from a raw store value.
    ///
    /// Returns [`TypeError::InvalidIdentity`] for negative values.
    pub fn new(raw: i64) -> Result<Self, TypeError> {
        if raw < 0 {
            return Err(TypeError::InvalidIdentity(raw));
        }
        Ok(Self(raw))
    }

    /// The raw scalar value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for EntityId {
    type Error = TypeError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Derive a placeholder identity from an object's memory address.
///
/// The result is always strictly negative. It is stable for as long as the
/// object stays at the same address, and distinct live objects get distinct
/// placeholders with high (not absolute) probability: the address is mixed
/// through a bijective finalizer and then folded into 63 bits, so two
/// addresses may share a placeholder. Callers must treat a placeholder as a
/// process-local hint, never as a persisted key.
pub fn placeholder_from_address(addr: usize) -> i64 {
    // splitmix64 finalizer
    let mut z = addr as u64;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    -((z >> 1) as i64) - 1
}
