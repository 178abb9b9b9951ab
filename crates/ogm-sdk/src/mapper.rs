use std::path::Path;
use std::sync::Arc;

use ogm_identity::{IdentityTracker, WrapperTypeCache};
use ogm_merge::{RawValues, Reconciler};
use ogm_metadata::{Coercion, DefaultCoercion, MetadataLookup};
use ogm_types::{Container, ContainerShape, ElementType, Entity, EntityId, EntityRef};
use tracing::debug;

use crate::config::OgmConfig;
use crate::error::SdkResult;

/// High-level mapper handle.
///
/// Owns the configuration, the metadata lookup, a [`Reconciler`] and an
/// [`IdentityTracker`], and exposes the hydration-time operations on them.
pub struct Ogm {
    config: OgmConfig,
    metadata: Arc<dyn MetadataLookup>,
    coercion: Arc<dyn Coercion>,
    reconciler: Reconciler,
    identity: IdentityTracker,
}

impl Ogm {
    /// Mapper with the default configuration.
    pub fn new(metadata: Arc<dyn MetadataLookup>) -> Self {
        Self::build(metadata, OgmConfig::default(), Arc::new(DefaultCoercion))
    }

    /// Mapper with a validated configuration.
    pub fn with_config(
        metadata: Arc<dyn MetadataLookup>,
        config: OgmConfig,
    ) -> SdkResult<Self> {
        config.validate()?;
        Ok(Self::build(metadata, config, Arc::new(DefaultCoercion)))
    }

    /// Mapper configured from a TOML file.
    pub fn open(
        metadata: Arc<dyn MetadataLookup>,
        config_path: impl AsRef<Path>,
    ) -> SdkResult<Self> {
        let config = OgmConfig::load(config_path)?;
        Self::with_config(metadata, config)
    }

    fn build(
        metadata: Arc<dyn MetadataLookup>,
        config: OgmConfig,
        coercion: Arc<dyn Coercion>,
    ) -> Self {
        let cache = Arc::new(WrapperTypeCache::from_config(&config.identity));
        Self::assemble(metadata, config, coercion, cache)
    }

    fn assemble(
        metadata: Arc<dyn MetadataLookup>,
        config: OgmConfig,
        coercion: Arc<dyn Coercion>,
        cache: Arc<WrapperTypeCache>,
    ) -> Self {
        let reconciler = Reconciler::new(Arc::clone(&coercion), config.merge.clone());
        let identity = IdentityTracker::with_cache(cache).with_coercion(Arc::clone(&coercion));
        Self {
            config,
            metadata,
            coercion,
            reconciler,
            identity,
        }
    }

    /// Replace the element coercion used for merging and identity fields.
    pub fn with_coercion(self, coercion: Arc<dyn Coercion>) -> Self {
        let cache = Arc::clone(self.identity.cache());
        Self::assemble(self.metadata, self.config, coercion, cache)
    }

    /// Share a wrapper-type cache with other mappers.
    pub fn with_wrapper_cache(self, cache: Arc<WrapperTypeCache>) -> Self {
        Self::assemble(self.metadata, self.config, self.coercion, cache)
    }

    /// The configuration the mapper was built with.
    pub fn config(&self) -> &OgmConfig {
        &self.config
    }

    /// The metadata source.
    pub fn metadata(&self) -> &Arc<dyn MetadataLookup> {
        &self.metadata
    }

    /// The collection reconciler.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// The identity tracker.
    pub fn identity(&self) -> &IdentityTracker {
        &self.identity
    }

    // ---- Hydration ----

    /// Merge store-read values into a current container.
    pub fn merge(
        &self,
        shape: ContainerShape,
        element_type: &ElementType,
        new_values: impl Into<RawValues>,
        current: Option<Container>,
    ) -> SdkResult<Container> {
        Ok(self
            .reconciler
            .merge(shape, element_type, new_values, current)?)
    }

    /// Merge store-read values into the collection field `field` of
    /// `entity` and write the result back. Returns the merged container.
    pub fn hydrate_collection(
        &self,
        entity: &dyn Entity,
        field: &str,
        new_values: impl Into<RawValues>,
    ) -> SdkResult<Container> {
        let info = self.metadata.class_info(entity)?;
        let accessor = info.collection(field)?;
        let current = accessor.read(entity)?;
        let merged = self.reconciler.merge(
            accessor.shape(),
            accessor.element_type(),
            new_values,
            current,
        )?;
        accessor.write(entity, merged.clone())?;
        debug!(
            type_name = info.type_name(),
            field,
            len = merged.len(),
            "collection hydrated"
        );
        Ok(merged)
    }

    /// [`Ogm::hydrate_collection`] for a JSON property value.
    pub fn hydrate_collection_json(
        &self,
        entity: &dyn Entity,
        field: &str,
        json: &serde_json::Value,
    ) -> SdkResult<Container> {
        let raw = RawValues::from_json(json)?;
        self.hydrate_collection(entity, field, raw)
    }

    /// Full label set of a node: static labels then dynamic ones.
    pub fn labels(&self, entity: &dyn Entity) -> SdkResult<Vec<String>> {
        let info = self.metadata.class_info(entity)?;
        Ok(info.labels(entity)?)
    }

    // ---- Identity ----

    /// See [`IdentityTracker::identity_or_placeholder`].
    pub fn identity_or_placeholder(&self, entity: &dyn Entity) -> SdkResult<i64> {
        Ok(self
            .identity
            .identity_or_placeholder(entity, self.metadata.as_ref())?)
    }

    /// See [`IdentityTracker::store_identity`].
    pub fn store_identity(&self, entity: &dyn Entity) -> SdkResult<Option<EntityId>> {
        Ok(self.identity.store_identity(entity, self.metadata.as_ref())?)
    }

    /// See [`IdentityTracker::assign_identity`].
    pub fn assign_identity(&self, entity: &dyn Entity, id: EntityId) -> SdkResult<()> {
        Ok(self
            .identity
            .assign_identity(entity, self.metadata.as_ref(), id)?)
    }

    /// See [`IdentityTracker::wrap`].
    pub fn wrap(&self, entity: &EntityRef) -> SdkResult<EntityRef> {
        Ok(self.identity.wrap(entity, self.metadata.as_ref())?)
    }
}

impl std::fmt::Debug for Ogm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ogm")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SdkError};
    use ogm_identity::{as_wrapper, IdentityError};
    use ogm_merge::{ListMergeMode, MergeError};
    use ogm_metadata::{ClassInfo, CollectionAccessor, MetaData, MetadataError, PropertyAccessor};
    use ogm_types::{CoercionError, Value};
    use serde_json::json;
    use std::any::Any;
    use std::io::Write;
    use std::sync::RwLock;

    #[derive(Debug, Default)]
    struct Movie {
        id: RwLock<Option<i64>>,
        tags: RwLock<Option<Container>>,
        ratings: RwLock<Option<Container>>,
    }

    impl Entity for Movie {
        fn type_name(&self) -> &str {
            "Movie"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug, Default)]
    struct Person {
        roles: RwLock<Option<Container>>,
    }

    impl Entity for Person {
        fn type_name(&self) -> &str {
            "Person"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn metadata() -> Arc<MetaData> {
        let meta = MetaData::new();
        meta.register(
            ClassInfo::builder("Movie")
                .identity_field(PropertyAccessor::read_write(
                    "id",
                    ElementType::Long,
                    |m: &Movie| Value::from(*m.id.read().unwrap()),
                    |m: &Movie, v| {
                        *m.id.write().unwrap() = v.as_i64();
                        Ok(())
                    },
                ))
                .collection(CollectionAccessor::read_write(
                    "tags",
                    ContainerShape::List,
                    ElementType::String,
                    |m: &Movie| m.tags.read().unwrap().clone(),
                    |m: &Movie, c| {
                        *m.tags.write().unwrap() = Some(c);
                        Ok(())
                    },
                ))
                .collection(CollectionAccessor::read_write(
                    "ratings",
                    ContainerShape::SortedSet,
                    ElementType::Integer,
                    |m: &Movie| m.ratings.read().unwrap().clone(),
                    |m: &Movie, c| {
                        *m.ratings.write().unwrap() = Some(c);
                        Ok(())
                    },
                ))
                .label("Movie")
                .build()
                .unwrap(),
        )
        .unwrap();
        meta.register(
            ClassInfo::builder("Person")
                .label("Person")
                .label_field(CollectionAccessor::read_write(
                    "roles",
                    ContainerShape::List,
                    ElementType::String,
                    |p: &Person| p.roles.read().unwrap().clone(),
                    |p: &Person, c| {
                        *p.roles.write().unwrap() = Some(c);
                        Ok(())
                    },
                ))
                .collection(CollectionAccessor::read_write(
                    "roles",
                    ContainerShape::List,
                    ElementType::String,
                    |p: &Person| p.roles.read().unwrap().clone(),
                    |p: &Person, c| {
                        *p.roles.write().unwrap() = Some(c);
                        Ok(())
                    },
                ))
                .build()
                .unwrap(),
        )
        .unwrap();
        Arc::new(meta)
    }

    fn strings(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn open_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[identity]\nwrapper_cache_capacity = 4\n[merge]\nlist_merge = \"append\""
        )
        .unwrap();
        let ogm = Ogm::open(metadata(), file.path()).unwrap();
        assert_eq!(ogm.config().merge.list_merge, ListMergeMode::Append);
        assert_eq!(ogm.identity().cache().capacity().get(), 4);
        assert_eq!(ogm.reconciler().options().list_merge, ListMergeMode::Append);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = OgmConfig::default();
        config.identity.wrapper_cache_capacity = 0;
        let err = Ogm::with_config(metadata(), config).unwrap_err();
        assert!(matches!(err, SdkError::Config(ConfigError::Invalid(_))));
    }

    // -----------------------------------------------------------------------
    // Hydration
    // -----------------------------------------------------------------------

    #[test]
    fn hydrate_merges_into_field() {
        let ogm = Ogm::new(metadata());
        let movie = Movie::default();

        ogm.hydrate_collection(&movie, "tags", strings(&["noir", "crime"]))
            .unwrap();
        let merged = ogm
            .hydrate_collection(&movie, "tags", strings(&["crime", "heist"]))
            .unwrap();
        assert_eq!(merged, Container::List(strings(&["noir", "crime", "heist"])));
        assert_eq!(*movie.tags.read().unwrap(), Some(merged));
    }

    #[test]
    fn hydrate_append_mode_keeps_duplicates() {
        let config = OgmConfig::from_toml_str("[merge]\nlist_merge = \"append\"").unwrap();
        let ogm = Ogm::with_config(metadata(), config).unwrap();
        let movie = Movie::default();

        ogm.hydrate_collection(&movie, "tags", strings(&["a"])).unwrap();
        let merged = ogm.hydrate_collection(&movie, "tags", strings(&["a", "b"])).unwrap();
        assert_eq!(merged, Container::List(strings(&["a", "a", "b"])));
    }

    #[test]
    fn hydrate_from_json_coerces_elements() {
        let ogm = Ogm::new(metadata());
        let movie = Movie::default();
        let merged = ogm
            .hydrate_collection_json(&movie, "ratings", &json!([5, 3, 5, 4]))
            .unwrap();
        let values: Vec<Value> = merged.iter().cloned().collect();
        assert_eq!(
            values,
            vec![Value::Integer(3), Value::Integer(4), Value::Integer(5)]
        );
    }

    #[test]
    fn hydrate_reports_coercion_failure() {
        let ogm = Ogm::new(metadata());
        let err = ogm
            .hydrate_collection_json(&Movie::default(), "ratings", &json!(["five"]))
            .unwrap_err();
        assert!(matches!(err, SdkError::Merge(MergeError::CoercionFailure(_))));
    }

    #[test]
    fn hydrate_unknown_field_fails() {
        let ogm = Ogm::new(metadata());
        let err = ogm
            .hydrate_collection(&Movie::default(), "cast", strings(&["x"]))
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::Metadata(MetadataError::UnknownField { .. })
        ));
    }

    #[test]
    fn merge_map_shape_is_unsupported() {
        let ogm = Ogm::new(metadata());
        let err = ogm
            .merge(ContainerShape::Map, &ElementType::Any, strings(&["x"]), None)
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::Merge(MergeError::UnsupportedContainerKind(_))
        ));
    }

    #[test]
    fn custom_coercion_reaches_reconciler() {
        struct Refuse;
        impl Coercion for Refuse {
            fn coerce(&self, target: &ElementType, value: Value) -> Result<Value, CoercionError> {
                Err(CoercionError::new(target.name(), value.to_string(), "refused"))
            }
        }

        let ogm = Ogm::new(metadata()).with_coercion(Arc::new(Refuse));
        let err = ogm
            .hydrate_collection(&Movie::default(), "tags", strings(&["x"]))
            .unwrap_err();
        assert!(matches!(err, SdkError::Merge(MergeError::CoercionFailure(_))));
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    #[test]
    fn labels_union_static_and_dynamic() {
        let ogm = Ogm::new(metadata());
        let person = Person::default();
        assert_eq!(ogm.labels(&person).unwrap(), vec!["Person"]);

        ogm.hydrate_collection(&person, "roles", strings(&["Actor", "Person", "Director"]))
            .unwrap();
        assert_eq!(
            ogm.labels(&person).unwrap(),
            vec!["Person", "Actor", "Director"]
        );
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    #[test]
    fn identity_roundtrip_through_facade() {
        let ogm = Ogm::new(metadata());
        let movie = Movie::default();
        assert!(ogm.identity_or_placeholder(&movie).unwrap() < 0);
        ogm.assign_identity(&movie, EntityId::new(10).unwrap()).unwrap();
        assert_eq!(ogm.store_identity(&movie).unwrap(), EntityId::new(10).ok());

        let person = EntityRef::new(Person::default());
        let wrapped = ogm.wrap(&person).unwrap();
        assert!(as_wrapper(&*wrapped).is_some());
        ogm.assign_identity(&*wrapped, EntityId::new(11).unwrap()).unwrap();
        assert_eq!(ogm.identity_or_placeholder(&*wrapped).unwrap(), 11);
    }

    #[test]
    fn wrapped_object_hydrates_through_wrapper() {
        let ogm = Ogm::new(metadata());
        let person = EntityRef::new(Person::default());
        let wrapped = ogm.wrap(&person).unwrap();
        ogm.hydrate_collection(&*wrapped, "roles", strings(&["Writer"]))
            .unwrap();
        assert_eq!(ogm.labels(&*person).unwrap(), vec!["Person", "Writer"]);
    }

    #[test]
    fn shared_wrapper_cache() {
        let cache = Arc::new(WrapperTypeCache::default());
        let a = Ogm::new(metadata()).with_wrapper_cache(Arc::clone(&cache));
        let b = Ogm::new(metadata()).with_wrapper_cache(Arc::clone(&cache));
        a.wrap(&EntityRef::new(Person::default())).unwrap();
        b.wrap(&EntityRef::new(Person::default())).unwrap();
        assert_eq!(cache.builds(), 1);
        assert!(matches!(
            a.assign_identity(&Person::default(), EntityId::new(1).unwrap()),
            Err(SdkError::Identity(IdentityError::Metadata(
                MetadataError::NoIdentityField(_)
            )))
        ));
    }
}
