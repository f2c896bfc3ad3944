//! Error types for Stratum

use thiserror::Error;

use crate::container::ContainerError;

/// Error thrown when an entity has no mappings in a mapper
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Entity ({entity}) is not registered")]
pub struct UnregisteredEntityError {
    pub entity: String,
}

/// Error thrown when an entity is mapped but the attribute is not
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Entity ({entity}) attr ({attr}) is not registered")]
pub struct UnregisteredAttributeError {
    pub entity: String,
    pub attr: String,
}

/// Error thrown when a mapping entry has no storage class for a storage type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No ({storage_type}) storage has been mapped")]
pub struct UnsupportedStorageTypeError {
    pub storage_type: String,
}

/// Error thrown when a mapper touches an entry owned by another namespace
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("You can not access a mapping outside of this container (mapper: {mapper}, entry: {entry})")]
pub struct CrossNamespaceAccessError {
    pub mapper: String,
    pub entry: String,
}

/// Error thrown when no repository is registered under the composed name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("RepositoryRunner: failed - repo {class_name} not defined")]
pub struct RepositoryNotFoundError {
    pub class_name: String,
}

/// Error thrown when a dotted attribute path cannot be walked to its end
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Attribute path ({path}) can not be traversed at ({segment})")]
pub struct UnresolvablePathError {
    pub path: String,
    pub segment: String,
}

/// Error thrown when a path ends on a nested object that has no value form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Attribute path ({path}) ends on an object without a value form (AttributeReader::to_value)")]
pub struct NestedObjectValueError {
    pub path: String,
}

/// Filter shapes rejected by criteria
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilterShapeError {
    #[error("Only simple domain expressions are allowed for exists criteria")]
    Conjunction,

    #[error("A filter expression has already been assigned")]
    AlreadyAssigned,

    #[error("Only allows relative domain attributes")]
    QualifiedAttribute,

    #[error("Invalid filter expression ({expr}): {reason}")]
    Parse { expr: String, reason: String },
}

/// General Stratum error type
#[derive(Debug, Error)]
pub enum StratumError {
    #[error(transparent)]
    UnregisteredEntity(#[from] UnregisteredEntityError),

    #[error(transparent)]
    UnregisteredAttribute(#[from] UnregisteredAttributeError),

    #[error(transparent)]
    UnsupportedStorageType(#[from] UnsupportedStorageTypeError),

    #[error(transparent)]
    CrossNamespaceAccess(#[from] CrossNamespaceAccessError),

    #[error(transparent)]
    RepositoryNotFound(#[from] RepositoryNotFoundError),

    #[error(transparent)]
    UnresolvablePath(#[from] UnresolvablePathError),

    #[error(transparent)]
    NestedObjectValue(#[from] NestedObjectValueError),

    #[error(transparent)]
    InvalidFilterShape(#[from] InvalidFilterShapeError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("repository mappings must be a mapping: {0}")]
    InvalidMapInput(String),

    #[error("Invalid mapping entry: {0}")]
    InvalidMappingEntry(String),

    #[error("Invalid domain name ({0})")]
    InvalidDomainName(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, StratumError>;
