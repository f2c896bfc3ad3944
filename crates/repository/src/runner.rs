//! RepositoryRunner - Dispatches repository calls by entity key
//!
//! The runner composes `<namespace>::<Entity>Repository` from the entity of
//! the call, resolves it from the [`RepositoryTable`] and delegates.

use std::sync::Arc;

use criteria::{Criteria, ExistsCriteria};
use serde_json::Value;
use shared::{DomainName, DomainObject, RepositoryNotFoundError, Result};
use tracing::debug;

use crate::repository::{EntityCollection, Repository};
use crate::table::RepositoryTable;

#[derive(Debug, Clone)]
pub struct RepositoryRunner {
    repo_namespace: String,
    table: Arc<RepositoryTable>,
}

impl RepositoryRunner {
    pub fn new(repo_namespace: impl Into<String>, table: Arc<RepositoryTable>) -> Self {
        Self {
            repo_namespace: repo_namespace.into(),
            table,
        }
    }

    pub fn repo_namespace(&self) -> &str {
        &self.repo_namespace
    }

    /// Whether an `entity_key` entity matching the attribute/value pairs exists
    ///
    /// Only one pair is accepted; a second one fails as an already assigned
    /// filter.
    pub fn exists<I, K, V>(&self, entity_key: &str, filters: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut criteria = ExistsCriteria::new(entity_key)?;
        let repo = self.resolve(&criteria.repo_name())?;

        for (attr, value) in filters {
            criteria.exists(attr.as_ref(), value)?;
        }
        debug!(entity = %entity_key, filter = ?criteria.filters().map(|e| e.to_string()), "exists");
        repo.exists(&criteria)
    }

    pub fn query(&self, criteria: &Criteria) -> Result<EntityCollection> {
        let repo = self.resolve(&criteria.repo_name())?;
        debug!(entity = %criteria.domain_name(), "query");
        repo.query(criteria)
    }

    pub fn persist(&self, entity: &dyn DomainObject) -> Result<()> {
        let domain = DomainName::parse(entity.domain_name())?;
        let repo = self.resolve(&domain.repo_name())?;
        debug!(entity = %domain, "persist");
        repo.persist(entity)
    }

    fn resolve(&self, repo_name: &str) -> Result<Box<dyn Repository>> {
        let class_name = RepositoryTable::class_name(&self.repo_namespace, repo_name);
        self.table
            .resolve(&class_name)
            .ok_or_else(|| RepositoryNotFoundError { class_name }.into())
    }
}
