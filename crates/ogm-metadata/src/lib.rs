//! Mapping metadata for the object-graph mapper.
//!
//! The mapper does not reflect over domain types. A discovery step (outside
//! this crate) registers one [`ClassInfo`] per mapped type, carrying accessor
//! tables built once up front: the optional identity field, scalar
//! properties, collection fields with their [`ContainerShape`], static labels
//! and an optional dynamic label field.
//!
//! # Contracts
//!
//! - [`MetadataLookup`] -- resolve the [`ClassInfo`] of an entity or type name
//! - [`Coercion`] -- convert a raw value to a declared [`ElementType`]
//!
//! [`MetaData`] is the in-memory registry implementing [`MetadataLookup`];
//! [`DefaultCoercion`] is the stock coercion used when none is injected.
//!
//! [`ContainerShape`]: ogm_types::ContainerShape
//! [`ElementType`]: ogm_types::ElementType

pub mod accessor;
pub mod class_info;
pub mod coercion;
pub mod error;
pub mod registry;

pub use accessor::{CollectionAccessor, PropertyAccessor};
pub use class_info::{ClassInfo, ClassInfoBuilder};
pub use coercion::{Coercion, DefaultCoercion};
pub use error::{MetadataError, MetadataResult};
pub use registry::{MetaData, MetadataLookup};
