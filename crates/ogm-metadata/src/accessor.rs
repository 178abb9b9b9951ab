//! Per-type field accessor tables.
//!
//! An accessor is a named pair of read/write functions registered once for a
//! concrete domain type. Accessors receive `&dyn Entity` and see through
//! stand-ins to the wrapped object, so the same table serves plain and
//! wrapped instances. Domain types that expose writable fields keep them in
//! interior-mutable cells, since entities are shared behind `Arc`.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use ogm_types::{Container, ContainerShape, ElementType, Entity, Value};

use crate::error::{MetadataError, MetadataResult};

type ReadFn<T> = dyn Fn(&dyn Entity) -> Option<T> + Send + Sync;
type WriteFn<T> = dyn Fn(&dyn Entity, T) -> Option<MetadataResult<()>> + Send + Sync;

fn mismatch(expected: &'static str, entity: &dyn Entity) -> MetadataError {
    MetadataError::TypeMismatch {
        expected: expected.to_string(),
        actual: entity.target().type_name().to_string(),
    }
}

/// Accessor for a scalar property (including the identity field).
#[derive(Clone)]
pub struct PropertyAccessor {
    name: String,
    element_type: ElementType,
    owner: &'static str,
    read: Arc<ReadFn<Value>>,
    write: Option<Arc<WriteFn<Value>>>,
}

impl PropertyAccessor {
    /// A property that can only be read.
    pub fn read_only<T, R>(name: impl Into<String>, element_type: ElementType, read: R) -> Self
    where
        T: Entity,
        R: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            element_type,
            owner: type_name::<T>(),
            read: Arc::new(move |entity: &dyn Entity| entity.downcast_ref::<T>().map(&read)),
            write: None,
        }
    }

    /// A property with both a reader and a writer.
    pub fn read_write<T, R, W>(
        name: impl Into<String>,
        element_type: ElementType,
        read: R,
        write: W,
    ) -> Self
    where
        T: Entity,
        R: Fn(&T) -> Value + Send + Sync + 'static,
        W: Fn(&T, Value) -> MetadataResult<()> + Send + Sync + 'static,
    {
        let mut accessor = Self::read_only(name, element_type, read);
        accessor.write = Some(Arc::new(move |entity: &dyn Entity, value: Value| {
            entity.downcast_ref::<T>().map(|t| write(t, value))
        }));
        accessor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Read the field from `entity`, looking through any stand-in.
    pub fn read(&self, entity: &dyn Entity) -> MetadataResult<Value> {
        (self.read)(entity).ok_or_else(|| mismatch(self.owner, entity))
    }

    /// Write the field on `entity`. Fails with
    /// [`MetadataError::ReadOnlyField`] when no writer was registered.
    pub fn write(&self, entity: &dyn Entity, value: Value) -> MetadataResult<()> {
        let Some(write) = &self.write else {
            return Err(MetadataError::ReadOnlyField {
                type_name: entity.target().type_name().to_string(),
                field: self.name.clone(),
            });
        };
        write(entity, value).unwrap_or_else(|| Err(mismatch(self.owner, entity)))
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("name", &self.name)
            .field("element_type", &self.element_type)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Accessor for an array- or collection-valued field.
///
/// Carries the field's [`ContainerShape`] and [`ElementType`] as classified
/// by the discovery step.
#[derive(Clone)]
pub struct CollectionAccessor {
    name: String,
    shape: ContainerShape,
    element_type: ElementType,
    owner: &'static str,
    read: Arc<ReadFn<Option<Container>>>,
    write: Option<Arc<WriteFn<Container>>>,
}

impl CollectionAccessor {
    /// Accessor for a collection field of `T` that cannot be written.
    pub fn read_only<T, R>(
        name: impl Into<String>,
        shape: ContainerShape,
        element_type: ElementType,
        read: R,
    ) -> Self
    where
        T: Entity,
        R: Fn(&T) -> Option<Container> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            shape,
            element_type,
            owner: type_name::<T>(),
            read: Arc::new(move |entity: &dyn Entity| entity.downcast_ref::<T>().map(&read)),
            write: None,
        }
    }

    /// Accessor for a collection field of `T` with a writer.
    pub fn read_write<T, R, W>(
        name: impl Into<String>,
        shape: ContainerShape,
        element_type: ElementType,
        read: R,
        write: W,
    ) -> Self
    where
        T: Entity,
        R: Fn(&T) -> Option<Container> + Send + Sync + 'static,
        W: Fn(&T, Container) -> MetadataResult<()> + Send + Sync + 'static,
    {
        let mut accessor = Self::read_only(name, shape, element_type, read);
        accessor.write = Some(Arc::new(move |entity: &dyn Entity, value: Container| {
            entity.downcast_ref::<T>().map(|t| write(t, value))
        }));
        accessor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> ContainerShape {
        self.shape
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Read the currently attached container. `Ok(None)` means the field is
    /// uninitialized.
    pub fn read(&self, entity: &dyn Entity) -> MetadataResult<Option<Container>> {
        (self.read)(entity).ok_or_else(|| mismatch(self.owner, entity))
    }

    /// Attach `value` to the field on `entity`.
    pub fn write(&self, entity: &dyn Entity, value: Container) -> MetadataResult<()> {
        let Some(write) = &self.write else {
            return Err(MetadataError::ReadOnlyField {
                type_name: entity.target().type_name().to_string(),
                field: self.name.clone(),
            });
        };
        write(entity, value).unwrap_or_else(|| Err(mismatch(self.owner, entity)))
    }
}

impl fmt::Debug for CollectionAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionAccessor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("element_type", &self.element_type)
            .field("writable", &self.write.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    struct Movie {
        id: RwLock<Option<i64>>,
        title: String,
        tags: RwLock<Option<Container>>,
    }

    impl Entity for Movie {
        fn type_name(&self) -> &str {
            "Movie"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Actor;

    impl Entity for Actor {
        fn type_name(&self) -> &str {
            "Actor"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn id_accessor() -> PropertyAccessor {
        PropertyAccessor::read_write(
            "id",
            ElementType::Long,
            |m: &Movie| Value::from(*m.id.read().unwrap()),
            |m: &Movie, v| {
                *m.id.write().unwrap() = v.as_i64();
                Ok(())
            },
        )
    }

    #[test]
    fn read_and_write_property() {
        let movie = Movie::default();
        let id = id_accessor();
        assert_eq!(id.read(&movie).unwrap(), Value::Null);
        id.write(&movie, Value::Long(9)).unwrap();
        assert_eq!(id.read(&movie).unwrap(), Value::Long(9));
    }

    #[test]
    fn read_only_property_rejects_write() {
        let title = PropertyAccessor::read_only("title", ElementType::String, |m: &Movie| {
            Value::from(m.title.as_str())
        });
        let movie = Movie {
            title: "Heat".into(),
            ..Default::default()
        };
        assert_eq!(title.read(&movie).unwrap(), Value::from("Heat"));
        assert!(!title.is_writable());
        assert!(matches!(
            title.write(&movie, Value::from("x")),
            Err(MetadataError::ReadOnlyField { .. })
        ));
    }

    #[test]
    fn accessor_on_wrong_type_is_mismatch() {
        let err = id_accessor().read(&Actor).unwrap_err();
        match err {
            MetadataError::TypeMismatch { actual, .. } => assert_eq!(actual, "Actor"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn collection_accessor_roundtrip() {
        let tags = CollectionAccessor::read_write(
            "tags",
            ContainerShape::List,
            ElementType::String,
            |m: &Movie| m.tags.read().unwrap().clone(),
            |m: &Movie, c| {
                *m.tags.write().unwrap() = Some(c);
                Ok(())
            },
        );
        let movie = Movie::default();
        assert_eq!(tags.read(&movie).unwrap(), None);
        tags.write(&movie, Container::List(vec![Value::from("noir")]))
            .unwrap();
        assert_eq!(
            tags.read(&movie).unwrap(),
            Some(Container::List(vec![Value::from("noir")]))
        );
        assert_eq!(tags.shape(), ContainerShape::List);
    }
}
