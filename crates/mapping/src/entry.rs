//! MappingEntry - One domain attribute to storage attribute correspondence
//!
//! Entries are created while mapping definitions are registered and never
//! change afterwards. The dotted domain path is split once here, so a
//! malformed path is rejected at registration instead of on first use.

use indexmap::IndexMap;
use shared::{DomainName, Result, StratumError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Qualified entity name, e.g. `shop.order`
    domain: String,
    /// Dotted attribute path on the domain object
    domain_attr: String,
    /// `domain_attr` split on `.`
    path: Vec<String>,
    /// Flat column/field name in storage
    storage_attr: String,
    /// Storage type tag -> storage class name
    storage: IndexMap<String, String>,
    /// Derived value, never read from the domain object
    computed: bool,
    /// Namespace the entry belongs to
    container_name: String,
}

impl MappingEntry {
    /// Create an entry, validating names and the attribute path
    pub fn new(
        container_name: impl Into<String>,
        domain: impl Into<String>,
        domain_attr: impl Into<String>,
        storage_attr: impl Into<String>,
    ) -> Result<Self> {
        let container_name = container_name.into();
        let domain = domain.into();
        let domain_attr = domain_attr.into();
        let storage_attr = storage_attr.into();

        if container_name.trim().is_empty() {
            return Err(StratumError::InvalidMappingEntry(format!(
                "container name is required for {}.{}",
                domain, domain_attr
            )));
        }
        DomainName::parse(&domain)?;

        let path: Vec<String> = domain_attr.split('.').map(|s| s.to_string()).collect();
        if path.iter().any(|s| s.trim().is_empty()) {
            return Err(StratumError::InvalidMappingEntry(format!(
                "domain attr ({}) of {} has an empty segment",
                domain_attr, domain
            )));
        }

        if storage_attr.trim().is_empty() {
            return Err(StratumError::InvalidMappingEntry(format!(
                "storage attr is required for {}.{}",
                domain, domain_attr
            )));
        }

        Ok(Self {
            domain,
            domain_attr,
            path,
            storage_attr,
            storage: IndexMap::new(),
            computed: false,
            container_name,
        })
    }

    /// Builder: map a storage type to a storage class name
    pub fn with_storage(mut self, storage_type: impl Into<String>, class_name: impl Into<String>) -> Self {
        self.storage.insert(storage_type.into(), class_name.into());
        self
    }

    /// Builder: mark the attribute as computed
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    // ========== Getters ==========

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn domain_attr(&self) -> &str {
        &self.domain_attr
    }

    /// Segments of the domain attribute path
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn storage_attr(&self) -> &str {
        &self.storage_attr
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    /// Check if a storage class is mapped for a storage type
    pub fn is_storage(&self, storage_type: &str) -> bool {
        self.storage.contains_key(storage_type)
    }

    /// Storage class name for a storage type
    pub fn storage(&self, storage_type: &str) -> Option<&str> {
        self.storage.get(storage_type).map(|s| s.as_str())
    }

    /// All storage type -> class name pairs
    pub fn storage_classes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.storage.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
