//! Mapping definition files
//!
//! ```yaml
//! entities:
//!   shop.order:
//!     id:            { storage_attr: order_id, storage: { memory: orders } }
//!     customer.name: { storage_attr: customer_name, storage: { memory: orders } }
//!     total:         { storage_attr: total, computed: true }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared::{Result, StratumError};

use crate::entry::MappingEntry;
use crate::map::EntityMap;

/// Definition of a single mapped attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDefinition {
    /// Column/field name in storage
    pub storage_attr: String,

    /// Storage type -> storage class name
    #[serde(default)]
    pub storage: IndexMap<String, String>,

    /// Value is derived rather than read from the domain object
    #[serde(default)]
    pub computed: bool,
}

/// Mapping definitions for one namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    /// entity -> domain_attr -> definition
    #[serde(default)]
    pub entities: IndexMap<String, IndexMap<String, EntryDefinition>>,
}

impl MappingConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(StratumError::Config(format!(
                "unsupported mapping file extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Turn definitions into validated entries owned by `container_name`
    pub fn into_entity_map(self, container_name: &str) -> Result<EntityMap> {
        let mut map = EntityMap::new();
        for (entity, attrs) in self.entities {
            map.insert_entity(entity.clone());
            for (domain_attr, def) in attrs {
                let mut entry = MappingEntry::new(container_name, entity.as_str(), domain_attr, def.storage_attr)?;
                for (storage_type, class_name) in def.storage {
                    entry = entry.with_storage(storage_type, class_name);
                }
                if def.computed {
                    entry = entry.computed();
                }
                map.register(entry)?;
            }
        }
        Ok(map)
    }
}
