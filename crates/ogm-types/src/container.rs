use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::value::Value;

/// Structural kind of an array- or collection-valued field.
///
/// The metadata layer classifies every such field once, at discovery time.
/// The set of shapes is closed; nothing downstream infers a shape from a
/// runtime value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerShape {
    /// Fixed-size array of the element type.
    Array,
    /// Ordered, duplicates allowed.
    List,
    /// Ordered, duplicates allowed. Materialized like [`ContainerShape::List`].
    Vector,
    /// Ordered by comparison, unique.
    SortedSet,
    /// Unique, insertion order preserved.
    Set,
    /// Generic iterable fallback: unique, insertion order preserved.
    Iterable,
    /// Keyed container. Recognized so that metadata can describe map fields,
    /// but never materialized from a merge.
    Map,
}

impl ContainerShape {
    /// Returns `true` for shapes that hold each value at most once.
    pub fn is_unique(self) -> bool {
        matches!(self, Self::SortedSet | Self::Set | Self::Iterable)
    }

    /// Returns `true` for shapes whose iteration order is insertion order.
    pub fn preserves_insertion_order(self) -> bool {
        !matches!(self, Self::SortedSet | Self::Map)
    }

    /// Canonical snake_case name, as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::List => "list",
            Self::Vector => "vector",
            Self::SortedSet => "sorted_set",
            Self::Set => "set",
            Self::Iterable => "iterable",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContainerShape {
    type Err = TypeError;

    /// Classify a declared container kind by name.
    ///
    /// Accepts the canonical shape names plus the common Rust collection
    /// names (`vec`, `hash_set`, `btree_set`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" | "[]" => Ok(Self::Array),
            "list" | "vec" => Ok(Self::List),
            "vector" | "vec_deque" => Ok(Self::Vector),
            "sorted_set" | "btree_set" => Ok(Self::SortedSet),
            "set" | "hash_set" | "index_set" => Ok(Self::Set),
            "iterable" => Ok(Self::Iterable),
            "map" | "hash_map" | "btree_map" | "index_map" => Ok(Self::Map),
            _ => Err(TypeError::UnsupportedContainerKind(s.to_string())),
        }
    }
}

/// A materialized container of values.
///
/// Equality of the [`Container::Set`] variant ignores order, like the
/// underlying `IndexSet`; use [`Container::iter`] to check order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Container {
    Array(Vec<Value>),
    List(Vec<Value>),
    SortedSet(BTreeSet<Value>),
    Set(IndexSet<Value>),
}

impl Container {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Array(v) | Self::List(v) => v.len(),
            Self::SortedSet(s) => s.len(),
            Self::Set(s) => s.len(),
        }
    }

    /// Returns `true` if the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the values in container order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Self::Array(v) | Self::List(v) => Box::new(v.iter()),
            Self::SortedSet(s) => Box::new(s.iter()),
            Self::Set(s) => Box::new(s.iter()),
        }
    }

    /// Consume the container, yielding its values in container order.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Array(v) | Self::List(v) => v,
            Self::SortedSet(s) => s.into_iter().collect(),
            Self::Set(s) => s.into_iter().collect(),
        }
    }

    /// Returns `true` if this container is already the variant that
    /// `shape` materializes to.
    pub fn has_shape(&self, shape: ContainerShape) -> bool {
        matches!(
            (self, shape),
            (Self::Array(_), ContainerShape::Array)
                | (Self::List(_), ContainerShape::List | ContainerShape::Vector)
                | (Self::SortedSet(_), ContainerShape::SortedSet)
                | (Self::Set(_), ContainerShape::Set | ContainerShape::Iterable)
        )
    }

    /// Returns `true` if any element equals `value`.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Array(v) | Self::List(v) => v.contains(value),
            Self::SortedSet(s) => s.contains(value),
            Self::Set(s) => s.contains(value),
        }
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Value;
    type IntoIter = Box<dyn Iterator<Item = &'a Value> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
