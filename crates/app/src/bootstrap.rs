//! Bootstrap - Assembles a namespace from a mapping file
//!
//! ```text
//! mappings.yaml ──▶ EntityMap ──▶ Container(<namespace>)
//!                                   ├── repository_mappings
//!                                   ├── persistence.memory.<class>   (one per class)
//!                                   └── <scope>.domains.<entity>     (HashEntity)
//!                                         │
//!                     RepositoryTable ◀───┘  <Namespace>::Repositories::<Entity>Repository
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use adapter::{primary_key, InMemoryRepository, InMemoryStorage, MEMORY};
use mapping::{EntityMap, MappingConfig};
use repository::{DomainConstructor, Repository, RepositoryRunner, RepositoryTable};
use serde::Deserialize;
use shared::{
    camelize, Container, DomainName, DomainObject, EntityHash, HashEntity, Registry, Result, StratumError,
    REPOSITORY_MAPPINGS,
};
use tracing::{debug, info};

/// One entity of a seed file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub domain: String,
    pub attributes: EntityHash,
}

/// Wired application
#[derive(Debug)]
pub struct App {
    namespace: String,
    registry: Arc<Registry>,
    map: Arc<EntityMap>,
    runner: RepositoryRunner,
}

impl App {
    /// Load the mapping file and wire the namespace
    pub fn from_mapping_file(namespace: &str, path: &Path) -> Result<Self> {
        let map = MappingConfig::from_file(path)?.into_entity_map(namespace)?;
        info!(path = %path.display(), entities = map.len(), "Loaded mapping file");
        Self::bootstrap(namespace, map)
    }

    /// Wire storages, domain constructors and repositories for every mapped entity
    ///
    /// Fails when two entities would be served by the same repository type,
    /// e.g. `shop.order` and `billing.order`.
    pub fn bootstrap(namespace: &str, map: EntityMap) -> Result<Self> {
        let map = Arc::new(map);
        let mut container = Container::new(namespace);
        container.register(REPOSITORY_MAPPINGS, Arc::clone(&map));

        for (class_name, key_column) in memory_classes(&map) {
            debug!(storage = %class_name, key = %key_column, "Registering memory storage");
            let storage = InMemoryStorage::new(class_name.clone()).with_key(key_column);
            container.register(InMemoryStorage::container_key(&class_name), Arc::new(storage));
        }

        for entity_name in map.entity_names() {
            let domain = DomainName::parse(entity_name)?;
            container.register::<DomainConstructor>(domain.qualify("domains"), hash_constructor(entity_name));
        }

        let registry = Arc::new(Registry::new().with_container(container));
        let repo_namespace = format!("{}::Repositories", camelize(namespace));
        let mut table = RepositoryTable::new(Arc::clone(&registry));
        let mut served: HashMap<String, &str> = HashMap::new();
        for entity_name in map.entity_names() {
            let class_name = RepositoryTable::class_name(&repo_namespace, &DomainName::parse(entity_name)?.repo_name());
            if let Some(other) = served.insert(class_name.clone(), entity_name) {
                return Err(StratumError::Config(format!(
                    "Entities ({}) and ({}) would share repository {}",
                    other, entity_name, class_name
                )));
            }

            let name = entity_name.to_string();
            table.register(&repo_namespace, entity_name, namespace, move |base| {
                Box::new(InMemoryRepository::new(base, name.clone())) as Box<dyn Repository>
            })?;
        }
        info!(namespace = %namespace, repositories = table.len(), "Repositories registered");

        Ok(Self {
            namespace: namespace.to_string(),
            registry,
            map,
            runner: RepositoryRunner::new(repo_namespace, Arc::new(table)),
        })
    }

    /// Persist every record of a JSON seed file
    pub fn seed_from_file(&self, path: &Path) -> Result<usize> {
        let records: Vec<SeedRecord> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        let count = records.len();
        for record in records {
            self.runner.persist(&HashEntity::new(record.domain, record.attributes))?;
        }
        info!(path = %path.display(), records = count, "Seeded storage");
        Ok(count)
    }

    // ========== Getters ==========

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn map(&self) -> &EntityMap {
        &self.map
    }

    pub fn runner(&self) -> &RepositoryRunner {
        &self.runner
    }
}

fn hash_constructor(entity_name: &str) -> Arc<DomainConstructor> {
    let entity_name = entity_name.to_string();
    Arc::new(move |hash: EntityHash| -> Result<Box<dyn DomainObject>> {
        Ok(Box::new(HashEntity::new(entity_name.clone(), hash)))
    })
}

/// Memory storage classes named by the map, each keyed on its entity's key column
fn memory_classes(map: &EntityMap) -> BTreeMap<String, String> {
    let mut classes: BTreeMap<String, String> = BTreeMap::new();
    for entity_name in map.entity_names() {
        let Some(entries) = map.entity(entity_name) else {
            continue;
        };
        let Some((_, key_column)) = primary_key(entries.values()) else {
            continue;
        };
        for class_name in entries.values().filter_map(|entry| entry.storage(MEMORY)) {
            classes
                .entry(class_name.to_string())
                .or_insert_with(|| key_column.to_string());
        }
    }
    classes
}
