//! High-level API for the object-graph mapper.
//!
//! [`Ogm`] bundles configuration, metadata, collection reconciliation and
//! identity tracking behind a single handle. This is the main entry point
//! for code that hydrates domain objects from store reads.

pub mod config;
pub mod error;
pub mod mapper;

pub use config::OgmConfig;
pub use error::{ConfigError, SdkError, SdkResult};
pub use mapper::Ogm;

// Re-export key types
pub use ogm_identity::{EntityWrapper, IdentityConfig, IdentityTracker, WrapperTypeCache};
pub use ogm_merge::{ListMergeMode, MergeOptions, RawValues, Reconciler};
pub use ogm_metadata::{
    ClassInfo, CollectionAccessor, Coercion, DefaultCoercion, MetaData, MetadataLookup,
    PropertyAccessor,
};
pub use ogm_types::{
    Container, ContainerShape, ElementType, Entity, EntityId, EntityRef, EnumType, Value,
};
