//! EntityMap - Registered mappings arranged by entity
//!
//! ```text
//! {
//!   "shop.order": { "id": <MappingEntry>, "customer.name": <MappingEntry> },
//!   "global.user": { .. },
//! }
//! ```
//!
//! Insertion order is kept so entries iterate in registration order.

use indexmap::IndexMap;
use serde_json::Value;
use shared::{Result, StratumError};

use crate::config::MappingConfig;
use crate::entry::MappingEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMap {
    entities: IndexMap<String, IndexMap<String, MappingEntry>>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON mapping definition
    ///
    /// The value must be an object of `entity -> { domain_attr -> entry }`.
    pub fn from_value(container_name: &str, value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(StratumError::InvalidMapInput(format!(
                "expected an object, got {}",
                json_type(value)
            )));
        }

        let entities = serde_json::from_value(value.clone())
            .map_err(|e| StratumError::InvalidMapInput(e.to_string()))?;
        MappingConfig { entities }.into_entity_map(container_name)
    }

    /// Make sure an entity is present, even with no attributes
    pub fn insert_entity(&mut self, entity_name: impl Into<String>) {
        self.entities.entry(entity_name.into()).or_default();
    }

    /// Register an entry under its `(domain, domain_attr)` pair
    ///
    /// An attribute can not be both a leaf and the parent of another
    /// attribute of the same entity (`group` next to `group.name`).
    pub fn register(&mut self, entry: MappingEntry) -> Result<()> {
        let attrs = self.entities.entry(entry.domain().to_string()).or_default();
        if attrs.contains_key(entry.domain_attr()) {
            return Err(StratumError::InvalidMappingEntry(format!(
                "Entity ({}) attr ({}) is already registered",
                entry.domain(),
                entry.domain_attr()
            )));
        }
        if let Some(existing) = attrs.keys().find(|attr| is_path_prefix(attr, entry.domain_attr())) {
            return Err(StratumError::InvalidMappingEntry(format!(
                "Entity ({}) attr ({}) conflicts with attr ({})",
                entry.domain(),
                entry.domain_attr(),
                existing
            )));
        }
        attrs.insert(entry.domain_attr().to_string(), entry);
        Ok(())
    }

    /// Builder: register an entry
    pub fn with_entry(mut self, entry: MappingEntry) -> Result<Self> {
        self.register(entry)?;
        Ok(self)
    }

    pub fn contains_entity(&self, entity_name: &str) -> bool {
        self.entities.contains_key(entity_name)
    }

    /// Attribute entries of an entity
    pub fn entity(&self, entity_name: &str) -> Option<&IndexMap<String, MappingEntry>> {
        self.entities.get(entity_name)
    }

    /// Registered entity names in registration order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// One path is a parent of the other, e.g. `group` and `group.name`
fn is_path_prefix(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    long.strip_prefix(short).is_some_and(|rest| rest.starts_with('.'))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
