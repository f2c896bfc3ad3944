//! RepositoryBase - State shared by every concrete repository
//!
//! Owns the mapper of the repository type and turns storage rows back into
//! domain objects. A feature can register a presenter for an entity and
//! storage type; without one the row is rebuilt as a nested hash and handed
//! to the entity's registered domain constructor.
//!
//! ```text
//! features.membership.presenters.db.user    presenter (optional)
//! features.membership.domains.user          domain constructor
//! global.presenters.db.user / global.domains.user
//! ```

use std::sync::Arc;

use mapping::Mapper;
use shared::{Container, DomainName, DomainObject, EntityHash, Inputs, Registry, Result, StorageRow};
use tracing::debug;

/// Custom builder turning a storage row into a domain object
pub type EntityBuilder = dyn Fn(&StorageRow, &Inputs) -> Result<Box<dyn DomainObject>> + Send + Sync;

/// Domain type constructor from a nested hash
pub type DomainConstructor = dyn Fn(EntityHash) -> Result<Box<dyn DomainObject>> + Send + Sync;

#[derive(Debug, Clone)]
pub struct RepositoryBase {
    registry: Arc<Registry>,
    mapper: Arc<Mapper>,
}

impl RepositoryBase {
    pub fn new(registry: Arc<Registry>, mapper: Arc<Mapper>) -> Self {
        Self { registry, mapper }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// The mapper as shared by all instances of the repository type
    pub fn shared_mapper(&self) -> Arc<Mapper> {
        Arc::clone(&self.mapper)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Container of the namespace the mapper is scoped to
    pub fn app_container(&self) -> Result<Arc<Container>> {
        Ok(self.registry.container(self.mapper.container_root_name())?)
    }

    pub fn to_storage(&self, entity: &dyn DomainObject) -> Result<StorageRow> {
        self.mapper.to_storage(entity)
    }

    /// Build a domain object from a storage row
    pub fn build(
        &self,
        domain_name: &str,
        storage_row: &StorageRow,
        storage_type: &str,
        inputs: &Inputs,
    ) -> Result<Box<dyn DomainObject>> {
        let builder = self.find_entity_builder(domain_name, storage_type)?;
        builder(storage_row, inputs)
    }

    /// Presenter registered for the entity and storage type, or the default
    /// builder going through the mapper and the domain constructor
    pub fn find_entity_builder(&self, domain_name: &str, storage_type: &str) -> Result<Arc<EntityBuilder>> {
        let domain = DomainName::parse(domain_name)?;
        let container = self.app_container()?;

        let presenter_key = domain.qualify(&format!("presenters.{}", storage_type));
        if container.contains(&presenter_key) {
            debug!(presenter = %presenter_key, "Using registered presenter");
            return Ok(container.get::<EntityBuilder>(&presenter_key)?);
        }

        let constructor = container.get::<DomainConstructor>(&domain.qualify("domains"))?;
        let mapper = Arc::clone(&self.mapper);
        let domain_name = domain_name.to_string();

        let builder: Arc<EntityBuilder> = Arc::new(move |row: &StorageRow, _inputs: &Inputs| {
            let hash = mapper.to_entity_hash(&domain_name, row)?;
            constructor(hash)
        });
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapping::{EntityMap, MappingEntry};
    use serde_json::{json, Value};
    use shared::{ContainerError, HashEntity, StratumError};

    fn map() -> EntityMap {
        EntityMap::new()
            .with_entry(MappingEntry::new("foo", "foo.bar", "id", "bar_id").unwrap())
            .unwrap()
            .with_entry(MappingEntry::new("foo", "foo.bar", "group.name", "group_name").unwrap())
            .unwrap()
    }

    fn hash_constructor(domain_name: &'static str) -> Arc<DomainConstructor> {
        Arc::new(move |hash: EntityHash| -> Result<Box<dyn DomainObject>> {
            Ok(Box::new(HashEntity::new(domain_name, hash)))
        })
    }

    fn base(container: Container) -> RepositoryBase {
        let registry = Arc::new(Registry::new().with_container(container));
        let mapper = Arc::new(Mapper::with_map(Arc::clone(&registry), "foo", map()));
        RepositoryBase::new(registry, mapper)
    }

    fn row() -> StorageRow {
        json!({"bar_id": 1, "group_name": "admins"}).as_object().cloned().unwrap()
    }

    #[test]
    fn test_default_builder_uses_domain_constructor() {
        let container = Container::new("foo").with::<DomainConstructor>(
            "features.foo.domains.bar",
            hash_constructor("foo.bar"),
        );
        let base = base(container);

        let entity = base.build("foo.bar", &row(), "db", &Inputs::new()).unwrap();
        assert_eq!(entity.domain_name(), "foo.bar");
        assert_eq!(
            entity.to_value().unwrap(),
            json!({"id": 1, "group": {"name": "admins"}})
        );
    }

    #[test]
    fn test_registered_presenter_wins() {
        let presenter: Arc<EntityBuilder> = Arc::new(|row: &StorageRow, inputs: &Inputs| {
            let mut attrs = row.clone();
            attrs.insert("presented".to_string(), Value::Bool(true));
            attrs.extend(inputs.clone());
            Ok(Box::new(HashEntity::new("foo.bar", attrs)) as Box<dyn DomainObject>)
        });
        let container = Container::new("foo")
            .with::<EntityBuilder>("features.foo.presenters.db.bar", presenter)
            .with::<DomainConstructor>("features.foo.domains.bar", hash_constructor("foo.bar"));
        let base = base(container);

        let inputs = json!({"source": "test"}).as_object().cloned().unwrap();
        let entity = base.build("foo.bar", &row(), "db", &inputs).unwrap();
        assert_eq!(
            entity.to_value().unwrap(),
            json!({"bar_id": 1, "group_name": "admins", "presented": true, "source": "test"})
        );

        // other storage types still use the default builder
        let entity = base.build("foo.bar", &row(), "file", &Inputs::new()).unwrap();
        assert_eq!(entity.to_value().unwrap()["id"], json!(1));
    }

    #[test]
    fn test_missing_domain_constructor() {
        let base = base(Container::new("foo"));
        let err = base.find_entity_builder("foo.bar", "db").err().unwrap();
        assert!(matches!(
            err,
            StratumError::Container(ContainerError::NotFound { ref key, .. }) if key == "features.foo.domains.bar"
        ));
    }

    #[test]
    fn test_to_storage_delegates_to_mapper() {
        let base = base(Container::new("foo"));
        let entity = HashEntity::new("foo.bar", json!({"id": 5}).as_object().cloned().unwrap());
        let err = base.to_storage(&entity).unwrap_err();
        // group.name is mapped but absent on the entity
        assert!(matches!(err, StratumError::UnresolvablePath(_)));

        let entity = HashEntity::new(
            "foo.bar",
            json!({"id": 5, "group": {"name": "ops"}}).as_object().cloned().unwrap(),
        );
        assert_eq!(
            Value::Object(base.to_storage(&entity).unwrap()),
            json!({"bar_id": 5, "group_name": "ops"})
        );
    }
}
