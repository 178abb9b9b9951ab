//! Collection reconciliation for the object-graph mapper.
//!
//! During hydration every array- or collection-valued field is rebuilt from
//! two sources: the values just read from the store and whatever is already
//! attached to the object in memory. The [`Reconciler`] merges the two into
//! a de-duplicated, order-preserving container of the field's declared
//! shape, so that partial and repeated loads never lose data.
//!
//! Raw store values are first normalized by [`RawValues`] (primitive arrays,
//! strings standing in for character arrays), then coerced element-wise
//! through the injected [`Coercion`](ogm_metadata::Coercion).

pub mod error;
pub mod raw;
pub mod reconciler;

pub use error::{MergeError, MergeResult};
pub use raw::RawValues;
pub use reconciler::{materialize, ListMergeMode, MergeOptions, Reconciler};
