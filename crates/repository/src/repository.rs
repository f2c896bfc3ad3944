//! Repository - Persistence contract for one entity
//!
//! Concrete repositories implement the three operations against their
//! storage and reach the mapper and builders through [`RepositoryBase`].

use criteria::{Criteria, ExistsCriteria};
use mapping::Mapper;
use shared::{DomainObject, Inputs, Result, StorageRow};

use crate::base::RepositoryBase;

/// Domain objects returned by a query
pub type EntityCollection = Vec<Box<dyn DomainObject>>;

pub trait Repository: Send + Sync {
    /// Shared repository state
    fn base(&self) -> &RepositoryBase;

    /// Whether any stored entity satisfies the criteria
    fn exists(&self, criteria: &ExistsCriteria) -> Result<bool>;

    /// Stored entities matching the criteria, built as domain objects
    fn query(&self, criteria: &Criteria) -> Result<EntityCollection>;

    /// Store a domain object
    fn persist(&self, entity: &dyn DomainObject) -> Result<()>;

    fn mapper(&self) -> &Mapper {
        self.base().mapper()
    }

    fn to_storage(&self, entity: &dyn DomainObject) -> Result<StorageRow> {
        self.base().to_storage(entity)
    }

    fn build(
        &self,
        domain_name: &str,
        storage_row: &StorageRow,
        storage_type: &str,
        inputs: &Inputs,
    ) -> Result<Box<dyn DomainObject>> {
        self.base().build(domain_name, storage_row, storage_type, inputs)
    }
}
