//! The collection reconciler.
//!
//! [`Reconciler::merge`] combines the values just read from the store with
//! the container already attached to a domain object, and materializes the
//! union in the field's declared [`ContainerShape`].
//!
//! # Union rules
//!
//! - No new values: the current container is returned unchanged. When it
//!   already has the target shape it is the very same container value (no
//!   copy, no coercion); callers rely on this pass-through.
//! - No current values: a fresh sequence of the coerced new values, in order,
//!   duplicates kept.
//! - Both sides non-empty: an insertion-ordered, duplicate-free union of the
//!   coerced current values followed by the coerced new values.
//!
//! The last rule applies to list shapes too, so a list merged from two
//! non-empty sides loses its duplicates while a list hydrated from one side
//! keeps them. This asymmetry is kept for compatibility with existing stores;
//! [`ListMergeMode::Append`] opts out of it explicitly.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexSet;
use ogm_metadata::{Coercion, DefaultCoercion};
use ogm_types::{Container, ContainerShape, ElementType, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::raw::RawValues;

/// How list-shaped fields merge when both sides are non-empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMergeMode {
    /// Union without duplicates (compatible default).
    #[default]
    Deduplicate,
    /// Current values followed by all new values, duplicates kept.
    Append,
}

/// Options for [`Reconciler`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub list_merge: ListMergeMode,
}

/// Merges store-read values into in-memory containers.
#[derive(Clone)]
pub struct Reconciler {
    coercion: Arc<dyn Coercion>,
    options: MergeOptions,
}

impl Reconciler {
    /// Reconciler converting elements with `coercion`.
    pub fn new(coercion: Arc<dyn Coercion>, options: MergeOptions) -> Self {
        Self { coercion, options }
    }

    /// The merge options in effect.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `new_values` into `current` and materialize the result as
    /// `shape`.
    ///
    /// Fails with [`MergeError::UnsupportedContainerKind`] for shapes that
    /// cannot be materialized, and with [`MergeError::CoercionFailure`] if
    /// any element cannot be converted to `element_type`.
    pub fn merge(
        &self,
        shape: ContainerShape,
        element_type: &ElementType,
        new_values: impl Into<RawValues>,
        current: Option<Container>,
    ) -> MergeResult<Container> {
        if shape == ContainerShape::Map {
            return Err(MergeError::unsupported(shape));
        }

        let new_values = new_values.into().normalize(element_type)?;
        let current_len = current.as_ref().map_or(0, Container::len);
        let new_len = new_values.len();

        let merged = match current {
            Some(current) if new_values.is_empty() => {
                if current.has_shape(shape) {
                    debug!(%shape, current = current_len, "no new values; current passed through");
                    return Ok(current);
                }
                materialize(shape, current.into_values())?
            }
            None if new_values.is_empty() => materialize(shape, Vec::new())?,
            Some(current) if !current.is_empty() => {
                let union = self.union(shape, element_type, current, new_values)?;
                materialize(shape, union)?
            }
            _ => {
                let fresh = self.coerce_all(element_type, new_values)?;
                materialize(shape, fresh)?
            }
        };

        debug!(
            %shape,
            element = %element_type,
            new = new_len,
            current = current_len,
            merged = merged.len(),
            "merged container"
        );
        Ok(merged)
    }

    fn coerce_all(
        &self,
        element_type: &ElementType,
        values: Vec<Value>,
    ) -> MergeResult<Vec<Value>> {
        values
            .into_iter()
            .map(|v| self.coercion.coerce(element_type, v).map_err(MergeError::from))
            .collect()
    }

    /// Union of two non-empty sides: current first, then new.
    fn union(
        &self,
        shape: ContainerShape,
        element_type: &ElementType,
        current: Container,
        new_values: Vec<Value>,
    ) -> MergeResult<Vec<Value>> {
        let current = self.coerce_all(element_type, current.into_values())?;
        let new_values = self.coerce_all(element_type, new_values)?;

        let keep_duplicates = self.options.list_merge == ListMergeMode::Append
            && matches!(shape, ContainerShape::List | ContainerShape::Vector);
        if keep_duplicates {
            let mut all = current;
            all.extend(new_values);
            return Ok(all);
        }

        let mut union: IndexSet<Value> = IndexSet::with_capacity(current.len() + new_values.len());
        union.extend(current);
        union.extend(new_values);
        Ok(union.into_iter().collect())
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCoercion), MergeOptions::default())
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("options", &self.options)
            .finish()
    }
}

/// Build a container of `shape` from values in union order.
///
/// Unique shapes keep insertion order unless they are sorted. Everything
/// else keeps every value in place.
pub fn materialize(shape: ContainerShape, values: Vec<Value>) -> MergeResult<Container> {
    if shape == ContainerShape::Map {
        return Err(MergeError::unsupported(shape));
    }
    let container = match (shape.is_unique(), shape.preserves_insertion_order()) {
        (true, true) => Container::Set(values.into_iter().collect::<IndexSet<_>>()),
        (true, false) => Container::SortedSet(values.into_iter().collect::<BTreeSet<_>>()),
        (false, _) if shape == ContainerShape::Array => Container::Array(values),
        (false, _) => Container::List(values),
    };
    Ok(container)
}
