//! Identity tracking for the object-graph mapper.
//!
//! Every persisted node carries a store-native identity. Domain types that
//! declare an identity field hold it themselves; for all others the tracker
//! hands out an [`EntityWrapper`] that stands in for the object and keeps
//! the identity out of band. Objects that have no identity yet are given a
//! negative placeholder derived from their address.
//!
//! Wrapper types are built once per concrete type and kept in a bounded
//! [`WrapperTypeCache`] that callers may share between trackers.

pub mod cache;
pub mod config;
pub mod error;
mod registry;
pub mod tracker;
pub mod wrapper;

pub use cache::WrapperTypeCache;
pub use config::IdentityConfig;
pub use error::{IdentityError, IdentityResult};
pub use tracker::{placeholder, IdentityTracker};
pub use wrapper::{as_wrapper, EntityWrapper, IdentitySlot, WrapperType};
