//! RepositoryTable - Explicit registry of repository types
//!
//! Each repository type is registered under its composed name
//! (`Shop::Repositories::OrderRepository`) together with a factory and the
//! namespace its mapper is scoped to. The mapper is created on first
//! resolution and shared by every instance of that type afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mapping::Mapper;
use once_cell::sync::OnceCell;
use shared::{DomainName, Registry, Result};
use tracing::{debug, warn};

use crate::base::RepositoryBase;
use crate::repository::Repository;

/// Creates a repository instance around its shared state
pub type RepositoryFactory = dyn Fn(RepositoryBase) -> Box<dyn Repository> + Send + Sync;

struct RegisteredRepository {
    container_name: String,
    factory: Arc<RepositoryFactory>,
    mapper: OnceCell<Arc<Mapper>>,
}

/// Receipt for a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    class_name: String,
    container_name: String,
}

impl RepositoryHandle {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }
}

pub struct RepositoryTable {
    registry: Arc<Registry>,
    repositories: HashMap<String, RegisteredRepository>,
}

impl RepositoryTable {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            repositories: HashMap::new(),
        }
    }

    /// Composed type name, e.g. `("Foo::Bar", "DomainRepository")`
    /// gives `Foo::Bar::DomainRepository`
    pub fn class_name(repo_namespace: &str, repo_name: &str) -> String {
        format!("{}::{}", repo_namespace, repo_name)
    }

    /// Register the repository serving `entity_key` under `repo_namespace`
    ///
    /// Its mapper loads the mappings of `container_name` on first use.
    pub fn register<F>(
        &mut self,
        repo_namespace: &str,
        entity_key: &str,
        container_name: &str,
        factory: F,
    ) -> Result<RepositoryHandle>
    where
        F: Fn(RepositoryBase) -> Box<dyn Repository> + Send + Sync + 'static,
    {
        let class_name = Self::class_name(repo_namespace, &DomainName::parse(entity_key)?.repo_name());
        self.insert(class_name, container_name, Arc::new(factory), OnceCell::new())
    }

    /// Register with a prepared mapper instead of a lazily created one
    pub fn register_with_mapper<F>(
        &mut self,
        repo_namespace: &str,
        entity_key: &str,
        mapper: Mapper,
        factory: F,
    ) -> Result<RepositoryHandle>
    where
        F: Fn(RepositoryBase) -> Box<dyn Repository> + Send + Sync + 'static,
    {
        let class_name = Self::class_name(repo_namespace, &DomainName::parse(entity_key)?.repo_name());
        let container_name = mapper.container_root_name().to_string();
        self.insert(class_name, &container_name, Arc::new(factory), OnceCell::with_value(Arc::new(mapper)))
    }

    fn insert(
        &mut self,
        class_name: String,
        container_name: &str,
        factory: Arc<RepositoryFactory>,
        mapper: OnceCell<Arc<Mapper>>,
    ) -> Result<RepositoryHandle> {
        let registered = RegisteredRepository {
            container_name: container_name.to_string(),
            factory,
            mapper,
        };
        if self.repositories.insert(class_name.clone(), registered).is_some() {
            warn!(repository = %class_name, "Repository registration replaced");
        } else {
            debug!(repository = %class_name, container = %container_name, "Repository registered");
        }

        Ok(RepositoryHandle {
            class_name,
            container_name: container_name.to_string(),
        })
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.repositories.contains_key(class_name)
    }

    /// New instance of the repository type, `None` if not registered
    pub fn resolve(&self, class_name: &str) -> Option<Box<dyn Repository>> {
        let registered = self.repositories.get(class_name)?;
        let mapper = registered
            .mapper
            .get_or_init(|| Arc::new(Mapper::new(Arc::clone(&self.registry), registered.container_name.clone())));
        let base = RepositoryBase::new(Arc::clone(&self.registry), Arc::clone(mapper));
        Some((registered.factory)(base))
    }

    /// Registered type names, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.repositories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

impl fmt::Debug for RepositoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryTable")
            .field("repositories", &self.class_names())
            .finish()
    }
}
