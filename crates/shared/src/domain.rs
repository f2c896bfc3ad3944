//! Domain object contracts
//!
//! Mapping code never knows concrete domain types. It walks them one
//! attribute at a time through [`AttributeReader`], which either yields a
//! leaf value or another reader for the next segment of a dotted path.

use serde_json::{Map, Value};

/// Nested `attr -> value` representation of a domain object
pub type EntityHash = Map<String, Value>;

/// Flat `storage_attr -> value` row as a storage driver sees it
pub type StorageRow = Map<String, Value>;

/// Extra inputs handed to entity builders
pub type Inputs = Map<String, Value>;

/// Result of reading one attribute
#[derive(Debug)]
pub enum Attribute<'a> {
    /// A leaf value
    Value(Value),
    /// A nested object that can be read further
    Object(&'a dyn AttributeReader),
}

/// Field accessor for one level of a domain object graph
pub trait AttributeReader: std::fmt::Debug {
    /// Read an attribute by name, `None` if the type has no such attribute
    fn attribute(&self, name: &str) -> Option<Attribute<'_>>;

    /// Whole object as a value, when a path ends on it
    ///
    /// Needed whenever a mapping entry's path stops at this object instead
    /// of one of its leaf attributes (`group` rather than `group.name`).
    /// Readers that keep the default `None` can only be mapped leaf by leaf;
    /// ending a path on them fails with `NestedObjectValueError`.
    fn to_value(&self) -> Option<Value> {
        None
    }
}

/// A domain entity that knows its qualified domain name
pub trait DomainObject: AttributeReader {
    /// Qualified name, e.g. `shop.order` or `global.user`
    fn domain_name(&self) -> &str;

    /// Upcast for traversal entry points
    fn as_reader(&self) -> &dyn AttributeReader;
}

impl AttributeReader for Map<String, Value> {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        self.get(name).map(|value| match value {
            Value::Object(nested) => Attribute::Object(nested),
            other => Attribute::Value(other.clone()),
        })
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Object(self.clone()))
    }
}

/// Generic domain object backed by a nested hash
///
/// Used as the default domain constructor when a feature has no dedicated
/// type for an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct HashEntity {
    domain_name: String,
    attributes: EntityHash,
}

impl HashEntity {
    pub fn new(domain_name: impl Into<String>, attributes: EntityHash) -> Self {
        Self {
            domain_name: domain_name.into(),
            attributes,
        }
    }

    pub fn attributes(&self) -> &EntityHash {
        &self.attributes
    }

    pub fn into_attributes(self) -> EntityHash {
        self.attributes
    }
}

impl AttributeReader for HashEntity {
    fn attribute(&self, name: &str) -> Option<Attribute<'_>> {
        self.attributes.attribute(name)
    }

    fn to_value(&self) -> Option<Value> {
        self.attributes.to_value()
    }
}

impl DomainObject for HashEntity {
    fn domain_name(&self) -> &str {
        &self.domain_name
    }

    fn as_reader(&self) -> &dyn AttributeReader {
        self
    }
}
