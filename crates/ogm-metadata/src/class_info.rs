use std::collections::BTreeMap;

use indexmap::IndexSet;
use ogm_types::{Entity, Value};

use crate::accessor::{CollectionAccessor, PropertyAccessor};
use crate::error::{MetadataError, MetadataResult};

/// Mapping metadata for one concrete domain type.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    type_name: String,
    identity_field: Option<PropertyAccessor>,
    properties: BTreeMap<String, PropertyAccessor>,
    collections: BTreeMap<String, CollectionAccessor>,
    static_labels: Vec<String>,
    label_field: Option<CollectionAccessor>,
    wrappable: bool,
}

impl ClassInfo {
    /// Start describing the type named `type_name`.
    pub fn builder(type_name: impl Into<String>) -> ClassInfoBuilder {
        ClassInfoBuilder::new(type_name)
    }

    /// The mapped type's name, as reported by [`Entity::type_name`].
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The declared identity field, if any.
    pub fn identity_field(&self) -> Option<&PropertyAccessor> {
        self.identity_field.as_ref()
    }

    /// Returns `true` if instances hold their own store identity.
    pub fn has_identity_field(&self) -> bool {
        self.identity_field.is_some()
    }

    /// Whether an identity wrapper may stand in for instances of this type.
    pub fn is_wrappable(&self) -> bool {
        self.wrappable
    }

    /// The scalar or array property named `name`.
    pub fn property(&self, name: &str) -> MetadataResult<&PropertyAccessor> {
        self.properties
            .get(name)
            .ok_or_else(|| self.unknown_field(name))
    }

    /// The collection-valued field named `name`.
    pub fn collection(&self, name: &str) -> MetadataResult<&CollectionAccessor> {
        self.collections
            .get(name)
            .ok_or_else(|| self.unknown_field(name))
    }

    /// Labels declared on the type itself, in declaration order.
    pub fn static_labels(&self) -> &[String] {
        &self.static_labels
    }

    /// The full label set of a node: static labels followed by the dynamic
    /// labels held in the label field, without duplicates.
    pub fn labels(&self, entity: &dyn Entity) -> MetadataResult<Vec<String>> {
        let mut labels: IndexSet<String> = self.static_labels.iter().cloned().collect();
        if let Some(field) = &self.label_field {
            if let Some(dynamic) = field.read(entity)? {
                for value in dynamic.iter() {
                    match value {
                        Value::String(s) => {
                            labels.insert(s.clone());
                        }
                        Value::Null => {}
                        other => {
                            return Err(MetadataError::TypeMismatch {
                                expected: "label string".to_string(),
                                actual: other.kind().to_string(),
                            })
                        }
                    }
                }
            }
        }
        Ok(labels.into_iter().collect())
    }

    fn unknown_field(&self, name: &str) -> MetadataError {
        MetadataError::UnknownField {
            type_name: self.type_name.clone(),
            field: name.to_string(),
        }
    }
}

/// Builder for [`ClassInfo`]. Validation happens in [`ClassInfoBuilder::build`].
#[derive(Debug)]
pub struct ClassInfoBuilder {
    type_name: String,
    identity_fields: Vec<PropertyAccessor>,
    properties: BTreeMap<String, PropertyAccessor>,
    collections: BTreeMap<String, CollectionAccessor>,
    static_labels: Vec<String>,
    label_field: Option<CollectionAccessor>,
    wrappable: bool,
}

impl ClassInfoBuilder {
    fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            identity_fields: Vec::new(),
            properties: BTreeMap::new(),
            collections: BTreeMap::new(),
            static_labels: Vec::new(),
            label_field: None,
            wrappable: true,
        }
    }

    /// Declare the identity field. The accessor is also registered as a
    /// regular property.
    pub fn identity_field(mut self, accessor: PropertyAccessor) -> Self {
        self.properties
            .insert(accessor.name().to_string(), accessor.clone());
        self.identity_fields.push(accessor);
        self
    }

    /// Register a scalar or array property.
    pub fn property(mut self, accessor: PropertyAccessor) -> Self {
        self.properties.insert(accessor.name().to_string(), accessor);
        self
    }

    /// Register a collection-valued field.
    pub fn collection(mut self, accessor: CollectionAccessor) -> Self {
        self.collections
            .insert(accessor.name().to_string(), accessor);
        self
    }

    /// Add a static label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.static_labels.push(label.into());
        self
    }

    /// Declare the field holding the node's dynamic labels.
    pub fn label_field(mut self, accessor: CollectionAccessor) -> Self {
        self.label_field = Some(accessor);
        self
    }

    /// Mark the type as sealed: no identity wrapper may stand in for it.
    pub fn sealed(mut self) -> Self {
        self.wrappable = false;
        self
    }

    /// Finish the description.
    ///
    /// Fails with [`MetadataError::DuplicateIdentityField`] when more than
    /// one identity field was declared.
    pub fn build(mut self) -> MetadataResult<ClassInfo> {
        if self.identity_fields.len() > 1 {
            return Err(MetadataError::DuplicateIdentityField {
                type_name: self.type_name,
                fields: self
                    .identity_fields
                    .iter()
                    .map(|f| f.name().to_string())
                    .collect(),
            });
        }
        Ok(ClassInfo {
            type_name: self.type_name,
            identity_field: self.identity_fields.pop(),
            properties: self.properties,
            collections: self.collections,
            static_labels: self.static_labels,
            label_field: self.label_field,
            wrappable: self.wrappable,
        })
    }
}
