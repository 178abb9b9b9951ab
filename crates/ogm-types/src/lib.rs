//! Foundation types for the object-graph mapper (OGM).
//!
//! This crate provides the identity, value, and structural types shared by
//! every other OGM crate. Nothing here talks to a store; it only describes
//! what the hydration layer moves around.
//!
//! # Key Types
//!
//! - [`EntityId`]: Store-native identity of a persisted domain object
//! - [`Value`]: Dynamically typed element value read from or written to the store
//! - [`ElementType`]: Declared element type of a property or container
//! - [`ContainerShape`]: Closed set of container kinds a field may declare
//! - [`Container`]: A materialized container of values
//! - [`Entity`] / [`EntityRef`]: Capability interface of a domain object

pub mod container;
pub mod element;
pub mod entity;
pub mod error;
pub mod identity;
pub mod value;

pub use container::{Container, ContainerShape};
pub use element::{ElementType, EnumType};
pub use entity::{Entity, EntityRef};
pub use error::{CoercionError, TypeError};
pub use identity::{placeholder_from_address, EntityId};
pub use value::Value;
