//! Mapper - Single source of truth for entity to storage mappings
//!
//! A mapper is scoped to one namespace. Its map is either supplied at
//! construction or loaded from the namespace container
//! (`repository_mappings`) on first access. Loading happens at most once
//! per mapper, guarded by a `OnceCell`, and the map is read-only
//! afterwards.
//!
//! Dotted attribute paths drive both directions:
//!
//! ```text
//! resolve_entity_value(order, "customer.address.city")
//!     order.customer -> customer.address -> address.city
//!
//! create_entity_hash("customer.address.city", "Oslo")
//!     {customer: {address: {city: "Oslo"}}}
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use shared::{
    Attribute, AttributeReader, CrossNamespaceAccessError, DomainObject, EntityHash, NestedObjectValueError, Registry,
    Result, StorageRow, UnregisteredAttributeError, UnregisteredEntityError,
    UnresolvablePathError, UnsupportedStorageTypeError, REPOSITORY_MAPPINGS,
};
use tracing::debug;

use crate::entry::MappingEntry;
use crate::map::EntityMap;

/// Value read for a mapped attribute
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue {
    Value(Value),
    /// Computed attributes are produced elsewhere and have no domain value
    Undefined,
}

impl EntityValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, EntityValue::Undefined)
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            EntityValue::Value(value) => Some(value),
            EntityValue::Undefined => None,
        }
    }
}

#[derive(Debug)]
pub struct Mapper {
    container_root_name: String,
    registry: Arc<Registry>,
    map: OnceCell<Arc<EntityMap>>,
}

impl Mapper {
    /// Create a mapper that loads its map from the namespace container
    pub fn new(registry: Arc<Registry>, container_root_name: impl Into<String>) -> Self {
        Self {
            container_root_name: container_root_name.into(),
            registry,
            map: OnceCell::new(),
        }
    }

    /// Create a mapper with an explicit map
    pub fn with_map(
        registry: Arc<Registry>,
        container_root_name: impl Into<String>,
        map: EntityMap,
    ) -> Self {
        Self {
            container_root_name: container_root_name.into(),
            registry,
            map: OnceCell::with_value(Arc::new(map)),
        }
    }

    /// Create a mapper from a JSON mapping definition
    pub fn from_value(
        registry: Arc<Registry>,
        container_root_name: impl Into<String>,
        value: &Value,
    ) -> Result<Self> {
        let container_root_name = container_root_name.into();
        let map = EntityMap::from_value(&container_root_name, value)?;
        Ok(Self::with_map(registry, container_root_name, map))
    }

    pub fn container_root_name(&self) -> &str {
        &self.container_root_name
    }

    /// The entity map, loading it from the container on first access
    pub fn map(&self) -> Result<&EntityMap> {
        let map = self.map.get_or_try_init(|| self.mappings_from_container())?;
        Ok(map.as_ref())
    }

    /// Check if an entity has been mapped
    pub fn is_entity(&self, entity_name: &str) -> Result<bool> {
        Ok(self.map()?.contains_entity(entity_name))
    }

    /// Check if an attribute is mapped for an entity
    pub fn is_entity_attr(&self, entity_name: &str, domain_attr: &str) -> Result<bool> {
        Ok(self
            .map()?
            .entity(entity_name)
            .map(|attrs| attrs.contains_key(domain_attr))
            .unwrap_or(false))
    }

    /// Mapping entry for an entity attribute
    pub fn find(&self, entity_name: &str, domain_attr: &str) -> Result<&MappingEntry> {
        let attrs = self.entity_entries(entity_name)?;
        attrs.get(domain_attr).ok_or_else(|| {
            UnregisteredAttributeError {
                entity: entity_name.to_string(),
                attr: domain_attr.to_string(),
            }
            .into()
        })
    }

    /// All entries of an entity in registration order
    ///
    /// The iterator is `Clone`, so it can be restarted.
    pub fn each_entity_attr(
        &self,
        entity_name: &str,
    ) -> Result<impl Iterator<Item = &MappingEntry> + Clone + '_> {
        Ok(self.entity_entries(entity_name)?.values())
    }

    /// Check if any entry of an entity maps to `storage_attr`
    pub fn storage_attr_mapped(&self, entity_name: &str, storage_attr: &str) -> Result<bool> {
        Ok(self
            .each_entity_attr(entity_name)?
            .any(|entry| entry.storage_attr() == storage_attr))
    }

    /// Storage attribute for an entity attribute
    pub fn storage_attr(&self, entity_name: &str, domain_attr: &str) -> Result<&str> {
        Ok(self.find(entity_name, domain_attr)?.storage_attr())
    }

    /// Resolve the storage class an entry maps to for `storage_type`
    ///
    /// The class is registered in the entry's container under
    /// `persistence.<storage_type>.<class name>`. Entries owned by another
    /// namespace are never resolved.
    pub fn storage_class_from_entry<T>(&self, entry: &MappingEntry, storage_type: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let class_name = entry.storage(storage_type).ok_or_else(|| UnsupportedStorageTypeError {
            storage_type: storage_type.to_string(),
        })?;

        if entry.container_name() != self.container_root_name {
            return Err(CrossNamespaceAccessError {
                mapper: self.container_root_name.clone(),
                entry: entry.container_name().to_string(),
            }
            .into());
        }

        let key = format!("persistence.{}.{}", storage_type, class_name);
        Ok(self.registry.get::<T>(entry.container_name(), &key)?)
    }

    /// Storage class for an entity attribute
    pub fn storage_class<T>(&self, entity_name: &str, domain_attr: &str, storage_type: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let entry = self.find(entity_name, domain_attr)?;
        self.storage_class_from_entry::<T>(entry, storage_type)
    }

    pub fn is_undefined(value: &EntityValue) -> bool {
        value.is_undefined()
    }

    /// Read a possibly nested attribute from a domain object
    ///
    /// Each segment of `domain_attr` is read from the object produced by the
    /// previous one. Fails when a segment is missing or when a leaf value is
    /// reached before the path ends.
    pub fn resolve_entity_value(domain: &dyn AttributeReader, domain_attr: &str) -> Result<Value> {
        let path: Vec<&str> = domain_attr.split('.').collect();
        resolve_path(domain, domain_attr, &path)
    }

    /// Domain value for an entry, `Undefined` for computed attributes
    pub fn entity_value(domain: &dyn AttributeReader, entry: &MappingEntry) -> Result<EntityValue> {
        if entry.is_computed() {
            return Ok(EntityValue::Undefined);
        }
        resolve_path(domain, entry.domain_attr(), entry.path()).map(EntityValue::Value)
    }

    /// Nested hash for a dotted attribute and its leaf value
    ///
    /// `("group.member.id", 5)` gives `{group: {member: {id: 5}}}`.
    pub fn create_entity_hash(domain_attr: &str, value: Value) -> EntityHash {
        let mut segments = domain_attr.rsplit('.');
        let mut hash = Map::new();
        if let Some(leaf) = segments.next() {
            hash.insert(leaf.to_string(), value);
        }

        for segment in segments {
            let mut outer = Map::new();
            outer.insert(segment.to_string(), Value::Object(hash));
            hash = outer;
        }
        hash
    }

    /// Rebuild the nested domain representation of a storage row
    ///
    /// Attributes whose storage column is absent from the row are left out.
    pub fn to_entity_hash(&self, entity_name: &str, storage_row: &StorageRow) -> Result<EntityHash> {
        let mut hash = Map::new();
        for entry in self.each_entity_attr(entity_name)? {
            let Some(value) = storage_row.get(entry.storage_attr()) else {
                continue;
            };
            deep_merge(&mut hash, Self::create_entity_hash(entry.domain_attr(), value.clone()));
        }
        Ok(hash)
    }

    /// Flatten a domain object into `storage_attr -> value`
    ///
    /// Computed attributes are skipped.
    pub fn to_storage(&self, domain: &dyn DomainObject) -> Result<StorageRow> {
        let mut row = Map::new();
        for entry in self.each_entity_attr(domain.domain_name())? {
            if let EntityValue::Value(value) = Self::entity_value(domain.as_reader(), entry)? {
                row.insert(entry.storage_attr().to_string(), value);
            }
        }
        Ok(row)
    }

    /// Flatten a domain object into one row per storage class
    ///
    /// Only entries mapped for `storage_type` contribute.
    pub fn to_storage_by_class(
        &self,
        domain: &dyn DomainObject,
        storage_type: &str,
    ) -> Result<IndexMap<String, StorageRow>> {
        let mut rows: IndexMap<String, StorageRow> = IndexMap::new();
        for entry in self.each_entity_attr(domain.domain_name())? {
            let Some(class_name) = entry.storage(storage_type) else {
                continue;
            };
            let row = rows.entry(class_name.to_string()).or_default();
            if let EntityValue::Value(value) = Self::entity_value(domain.as_reader(), entry)? {
                row.insert(entry.storage_attr().to_string(), value);
            }
        }
        Ok(rows)
    }

    fn entity_entries(&self, entity_name: &str) -> Result<&IndexMap<String, MappingEntry>> {
        self.map()?.entity(entity_name).ok_or_else(|| {
            UnregisteredEntityError {
                entity: entity_name.to_string(),
            }
            .into()
        })
    }

    fn mappings_from_container(&self) -> Result<Arc<EntityMap>> {
        debug!(container = %self.container_root_name, "Loading repository mappings");
        Ok(self
            .registry
            .get::<EntityMap>(&self.container_root_name, REPOSITORY_MAPPINGS)?)
    }
}

fn resolve_path<S: AsRef<str>>(domain: &dyn AttributeReader, full_path: &str, segments: &[S]) -> Result<Value> {
    let unresolvable = |segment: &str| UnresolvablePathError {
        path: full_path.to_string(),
        segment: segment.to_string(),
    };

    let Some((first, rest)) = segments.split_first() else {
        return Err(unresolvable("").into());
    };
    let first = first.as_ref();
    let attribute = domain.attribute(first).ok_or_else(|| unresolvable(first))?;

    match (attribute, rest.first()) {
        (Attribute::Value(value), None) => Ok(value),
        (Attribute::Object(nested), None) => Ok(nested.to_value().ok_or_else(|| NestedObjectValueError {
            path: full_path.to_string(),
        })?),
        (Attribute::Object(nested), Some(_)) => resolve_path(nested, full_path, rest),
        (Attribute::Value(Value::Object(nested)), Some(_)) => resolve_path(&nested, full_path, rest),
        (Attribute::Value(_), Some(next)) => Err(unresolvable(next.as_ref()).into()),
    }
}

fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        if let Value::Object(nested) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                deep_merge(existing, nested);
                continue;
            }
            target.insert(key, Value::Object(nested));
        } else {
            target.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{Container, HashEntity, StratumError};

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::new())
    }

    fn create_mapper(root_name: &str, map: EntityMap) -> Mapper {
        Mapper::with_map(registry(), root_name, map)
    }

    fn entry(container: &str, domain: &str, attr: &str, storage_attr: &str) -> MappingEntry {
        MappingEntry::new(container, domain, attr, storage_attr)
            .unwrap()
            .with_storage("db", "bar")
    }

    fn foo_bar_map() -> EntityMap {
        EntityMap::new()
            .with_entry(entry("my_root", "foo.bar", "id", "bar_id"))
            .unwrap()
            .with_entry(entry("my_root", "foo.bar", "group.name", "group_name"))
            .unwrap()
    }

    // ========== Test domain graph ==========

    #[derive(Debug)]
    struct Role {
        id: i64,
    }

    impl AttributeReader for Role {
        fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
            match name {
                "id" => Some(Attribute::Value(json!(self.id))),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct User {
        role: Role,
    }

    impl AttributeReader for User {
        fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
            match name {
                "role" => Some(Attribute::Object(&self.role)),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct Member {
        user: User,
    }

    impl AttributeReader for Member {
        fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
            match name {
                "user" => Some(Attribute::Object(&self.user)),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct Group {
        member: Member,
        name: String,
    }

    impl AttributeReader for Group {
        fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
            match name {
                "member" => Some(Attribute::Object(&self.member)),
                "name" => Some(Attribute::Value(json!(self.name))),
                _ => None,
            }
        }
    }

    #[derive(Debug)]
    struct Domain {
        id: i64,
        group: Group,
    }

    impl AttributeReader for Domain {
        fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
            match name {
                "id" => Some(Attribute::Value(json!(self.id))),
                "group" => Some(Attribute::Object(&self.group)),
                _ => None,
            }
        }
    }

    impl DomainObject for Domain {
        fn domain_name(&self) -> &str {
            "foo.bar"
        }

        fn as_reader(&self) -> &dyn AttributeReader {
            self
        }
    }

    fn domain() -> Domain {
        Domain {
            id: 99,
            group: Group {
                name: "admins".to_string(),
                member: Member {
                    user: User {
                        role: Role { id: 123456 },
                    },
                },
            },
        }
    }

    // ========== Construction ==========

    #[test]
    fn test_initializes_with_container_root_name() {
        let mapper = Mapper::new(registry(), "foo");
        assert_eq!(mapper.container_root_name(), "foo");
    }

    #[test]
    fn test_manual_map() {
        let map = foo_bar_map();
        let mapper = create_mapper("my_root", map.clone());
        assert_eq!(mapper.map().unwrap(), &map);
    }

    #[test]
    fn test_from_value_rejects_non_mapping() {
        let err = Mapper::from_value(registry(), "foo", &json!("bar")).unwrap_err();
        assert!(matches!(err, StratumError::InvalidMapInput(_)));
    }

    #[test]
    fn test_loads_map_from_container() {
        let map = foo_bar_map();
        let mut container = Container::new("foo");
        container.register(REPOSITORY_MAPPINGS, Arc::new(map.clone()));
        let registry = Arc::new(Registry::new().with_container(container));

        let mapper = Mapper::new(registry, "foo");
        assert_eq!(mapper.map().unwrap(), &map);
        // second access reuses the loaded map
        assert!(std::ptr::eq(mapper.map().unwrap(), mapper.map().unwrap()));
    }

    #[test]
    fn test_load_fails_without_container() {
        let mapper = Mapper::new(registry(), "foo");
        let err = mapper.map().unwrap_err();
        assert!(matches!(err, StratumError::Container(_)));
    }

    // ========== Lookups ==========

    #[test]
    fn test_entity() {
        let mut map = EntityMap::new();
        map.insert_entity("foo.bar");
        let mapper = create_mapper("foo", map);

        assert!(mapper.is_entity("foo.bar").unwrap());
        assert!(!mapper.is_entity("foo.baz").unwrap());
    }

    #[test]
    fn test_entity_attr() {
        let mapper = create_mapper("my_root", foo_bar_map());

        assert!(mapper.is_entity_attr("foo.bar", "id").unwrap());
        assert!(!mapper.is_entity_attr("foo.bar", "baz").unwrap());
        assert!(!mapper.is_entity_attr("foo.nope", "id").unwrap());
    }

    #[test]
    fn test_find_existing_entry() {
        let mapper = create_mapper("my_root", foo_bar_map());
        let entry = mapper.find("foo.bar", "id").unwrap();
        assert_eq!(entry.storage_attr(), "bar_id");
    }

    #[test]
    fn test_find_fails_for_unknown_entity() {
        let mapper = create_mapper("my_root", EntityMap::new());
        let err = mapper.find("foo.bar", "id").unwrap_err();
        assert!(matches!(err, StratumError::UnregisteredEntity(_)));
        assert_eq!(err.to_string(), "Entity (foo.bar) is not registered");
    }

    #[test]
    fn test_find_fails_for_unknown_attr() {
        let mut map = EntityMap::new();
        map.insert_entity("foo.bar");
        let mapper = create_mapper("my_root", map);

        let err = mapper.find("foo.bar", "baz").unwrap_err();
        assert!(matches!(err, StratumError::UnregisteredAttribute(_)));
        assert_eq!(err.to_string(), "Entity (foo.bar) attr (baz) is not registered");
    }

    #[test]
    fn test_each_entity_attr_in_order_and_restartable() {
        let mapper = create_mapper("my_root", foo_bar_map());
        let entries = mapper.each_entity_attr("foo.bar").unwrap();

        let first: Vec<&str> = entries.clone().map(|e| e.domain_attr()).collect();
        let second: Vec<&str> = entries.map(|e| e.domain_attr()).collect();
        assert_eq!(first, vec!["id", "group.name"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_each_entity_attr_unknown_entity() {
        let mapper = create_mapper("my_root", EntityMap::new());
        assert!(matches!(
            mapper.each_entity_attr("foo.bar").err(),
            Some(StratumError::UnregisteredEntity(_))
        ));
    }

    #[test]
    fn test_storage_attr_mapped() {
        let mapper = create_mapper("my_root", foo_bar_map());

        assert!(mapper.storage_attr_mapped("foo.bar", "bar_id").unwrap());
        assert!(!mapper.storage_attr_mapped("foo.bar", "baz").unwrap());

        let err = mapper.storage_attr_mapped("foo.nope", "bar_id").unwrap_err();
        assert_eq!(err.to_string(), "Entity (foo.nope) is not registered");
    }

    #[test]
    fn test_storage_attr() {
        let mapper = create_mapper("my_root", foo_bar_map());

        assert_eq!(mapper.storage_attr("foo.bar", "group.name").unwrap(), "group_name");
        assert_eq!(
            mapper.storage_attr("foo.bar", "baz").unwrap_err().to_string(),
            "Entity (foo.bar) attr (baz) is not registered"
        );
        assert_eq!(
            mapper.storage_attr("foo.nope", "id").unwrap_err().to_string(),
            "Entity (foo.nope) is not registered"
        );
    }

    // ========== Storage classes ==========

    #[test]
    fn test_storage_class_unsupported_type() {
        let mapper = create_mapper("my_root", EntityMap::new());
        let entry = entry("my_root", "foo.bar", "id", "bar_id");

        let err = mapper.storage_class_from_entry::<String>(&entry, "file").unwrap_err();
        assert!(matches!(err, StratumError::UnsupportedStorageType(_)));
        assert_eq!(err.to_string(), "No (file) storage has been mapped");
    }

    #[test]
    fn test_storage_class_cross_namespace() {
        let mapper = create_mapper("foo", EntityMap::new());
        let entry = entry("bar", "foo.bar", "id", "bar_id");

        let err = mapper.storage_class_from_entry::<String>(&entry, "db").unwrap_err();
        assert!(matches!(err, StratumError::CrossNamespaceAccess(_)));
        assert_eq!(
            err.to_string(),
            "You can not access a mapping outside of this container (mapper: foo, entry: bar)"
        );
    }

    #[test]
    fn test_storage_class_from_container() {
        let container = Container::new("foo")
            .with("persistence.db.bar", Arc::new("some active record model".to_string()));
        let registry = Arc::new(Registry::new().with_container(container));
        let map = EntityMap::new()
            .with_entry(entry("foo", "foo.bar", "id", "bar_id"))
            .unwrap();
        let mapper = Mapper::with_map(registry, "foo", map);

        let entry = mapper.find("foo.bar", "id").unwrap();
        let class = mapper.storage_class_from_entry::<String>(entry, "db").unwrap();
        assert_eq!(class.as_str(), "some active record model");

        let class = mapper.storage_class::<String>("foo.bar", "id", "db").unwrap();
        assert_eq!(class.as_str(), "some active record model");
    }

    #[test]
    fn test_storage_class_propagates_find_errors() {
        let mapper = create_mapper("foo", EntityMap::new());
        let err = mapper.storage_class::<String>("foo.bar", "id", "db").unwrap_err();
        assert!(matches!(err, StratumError::UnregisteredEntity(_)));
    }

    // ========== Values ==========

    #[test]
    fn test_undefined() {
        assert!(Mapper::is_undefined(&EntityValue::Undefined));
        assert!(!Mapper::is_undefined(&EntityValue::Value(json!("some value"))));
    }

    #[test]
    fn test_resolve_top_level_attribute() {
        let value = Mapper::resolve_entity_value(&domain(), "id").unwrap();
        assert_eq!(value, json!(99));
    }

    #[test]
    fn test_resolve_traverses_nested_objects() {
        let value = Mapper::resolve_entity_value(&domain(), "group.member.user.role.id").unwrap();
        assert_eq!(value, json!(123456));
    }

    #[test]
    fn test_resolve_missing_segment() {
        let err = Mapper::resolve_entity_value(&domain(), "group.owner.id").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute path (group.owner.id) can not be traversed at (owner)"
        );
    }

    #[test]
    fn test_resolve_through_leaf_fails() {
        let err = Mapper::resolve_entity_value(&domain(), "id.value").unwrap_err();
        assert!(matches!(err, StratumError::UnresolvablePath(_)));
        assert!(err.to_string().contains("at (value)"));
    }

    #[test]
    fn test_resolve_object_without_value_form() {
        let err = Mapper::resolve_entity_value(&domain(), "group.member").unwrap_err();
        assert!(matches!(err, StratumError::NestedObjectValue(_)));
        assert_eq!(
            err.to_string(),
            "Attribute path (group.member) ends on an object without a value form (AttributeReader::to_value)"
        );
    }

    #[test]
    fn test_resolve_nested_hash_as_value() {
        let hash = json!({"group": {"name": "admins"}}).as_object().cloned().unwrap();
        let value = Mapper::resolve_entity_value(&hash, "group").unwrap();
        assert_eq!(value, json!({"name": "admins"}));
    }

    #[test]
    fn test_entity_value() {
        let entry = entry("foo", "foo.bar", "group.member.user.role.id", "role_id");
        let value = Mapper::entity_value(&domain(), &entry).unwrap();
        assert_eq!(value, EntityValue::Value(json!(123456)));

        let computed = entry.computed();
        assert!(Mapper::entity_value(&domain(), &computed).unwrap().is_undefined());
    }

    #[test]
    fn test_create_entity_hash() {
        assert_eq!(
            Value::Object(Mapper::create_entity_hash("id", json!(12345))),
            json!({"id": 12345})
        );
        assert_eq!(
            Value::Object(Mapper::create_entity_hash("group.member.user.role.id", json!(12345))),
            json!({"group": {"member": {"user": {"role": {"id": 12345}}}}})
        );
    }

    #[test]
    fn test_to_entity_hash_merges_shared_prefixes() {
        let map = EntityMap::new()
            .with_entry(entry("foo", "foo.bar", "id", "bar_id"))
            .unwrap()
            .with_entry(entry("foo", "foo.bar", "group.name", "group_name"))
            .unwrap()
            .with_entry(entry("foo", "foo.bar", "group.member.id", "member_id"))
            .unwrap();
        let mapper = create_mapper("foo", map);

        let row = json!({"bar_id": 1, "group_name": "admins", "member_id": 5, "extra": true});
        let hash = mapper.to_entity_hash("foo.bar", row.as_object().unwrap()).unwrap();

        assert_eq!(
            Value::Object(hash),
            json!({"id": 1, "group": {"name": "admins", "member": {"id": 5}}})
        );
    }

    #[test]
    fn test_to_entity_hash_round_trip() {
        let map = EntityMap::new()
            .with_entry(entry("foo", "foo.bar", "id", "bar_id"))
            .unwrap()
            .with_entry(entry("foo", "foo.bar", "group.member.user.role.id", "role_id"))
            .unwrap();
        let mapper = create_mapper("foo", map);

        let row = json!({"bar_id": 7, "role_id": 42});
        let hash = mapper.to_entity_hash("foo.bar", row.as_object().unwrap()).unwrap();

        for entry in mapper.each_entity_attr("foo.bar").unwrap() {
            let value = Mapper::resolve_entity_value(&hash, entry.domain_attr()).unwrap();
            assert_eq!(&value, &row[entry.storage_attr()]);
        }
    }

    #[test]
    fn test_to_entity_hash_skips_absent_columns() {
        let mapper = create_mapper("my_root", foo_bar_map());
        let row = json!({"bar_id": 1});
        let hash = mapper.to_entity_hash("foo.bar", row.as_object().unwrap()).unwrap();
        assert_eq!(Value::Object(hash), json!({"id": 1}));
    }

    #[test]
    fn test_to_storage_skips_computed() {
        let map = EntityMap::new()
            .with_entry(entry("foo", "foo.bar", "id", "bar_id"))
            .unwrap()
            .with_entry(entry("foo", "foo.bar", "group.name", "group_name"))
            .unwrap()
            .with_entry(entry("foo", "foo.bar", "score", "score").computed())
            .unwrap();
        let mapper = create_mapper("foo", map);

        let row = mapper.to_storage(&domain()).unwrap();
        assert_eq!(Value::Object(row), json!({"bar_id": 99, "group_name": "admins"}));
    }

    #[test]
    fn test_to_storage_by_class() {
        let map = EntityMap::new()
            .with_entry(
                MappingEntry::new("foo", "foo.bar", "id", "bar_id")
                    .unwrap()
                    .with_storage("db", "bars"),
            )
            .unwrap()
            .with_entry(
                MappingEntry::new("foo", "foo.bar", "group.name", "name")
                    .unwrap()
                    .with_storage("db", "groups"),
            )
            .unwrap()
            .with_entry(MappingEntry::new("foo", "foo.bar", "group.member.user.role.id", "role_id").unwrap())
            .unwrap();
        let mapper = create_mapper("foo", map);

        let rows = mapper.to_storage_by_class(&domain(), "db").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(Value::Object(rows["bars"].clone()), json!({"bar_id": 99}));
        assert_eq!(Value::Object(rows["groups"].clone()), json!({"name": "admins"}));
    }

    #[test]
    fn test_to_storage_from_hash_entity() {
        let mapper = create_mapper("my_root", foo_bar_map());
        let attrs = json!({"id": 3, "group": {"name": "ops"}}).as_object().cloned().unwrap();
        let entity = HashEntity::new("foo.bar", attrs);

        let row = mapper.to_storage(&entity).unwrap();
        assert_eq!(Value::Object(row), json!({"bar_id": 3, "group_name": "ops"}));
    }
}
