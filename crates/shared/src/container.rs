//! Namespace-scoped dependency containers
//!
//! A [`Container`] holds everything one application namespace registers
//! during bootstrap: its repository mappings, storage classes, presenters
//! and domain constructors. Keys are dotted strings
//! (`persistence.db.user_record`, `features.shop.domains.order`, ...) and
//! values are stored as `Arc<T>` behind `dyn Any`, downcast on read. `T`
//! may be a trait object or a closure type such as
//! `dyn Fn(&Row) -> Out + Send + Sync`.
//!
//! A [`Registry`] groups containers by namespace name. Both are populated
//! through `&mut self` during bootstrap and then shared behind `Arc`, so
//! reads never take a lock.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Key under which a namespace registers its mapping definitions
pub const REPOSITORY_MAPPINGS: &str = "repository_mappings";

/// Container lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("Nothing registered in container ({namespace}) under key ({key})")]
    NotFound { namespace: String, key: String },

    #[error("Value registered in container ({namespace}) under key ({key}) has a different type")]
    TypeMismatch { namespace: String, key: String },

    #[error("Container ({0}) is not registered")]
    UnknownNamespace(String),
}

type Boxed = Box<dyn Any + Send + Sync>;

/// Key/value store for a single namespace
pub struct Container {
    name: String,
    entries: HashMap<String, Boxed>,
}

impl Container {
    /// Create an empty container for a namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Namespace this container belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a value under a dotted key, replacing any previous value
    pub fn register<T>(&mut self, key: impl Into<String>, value: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Builder: register a value
    pub fn with<T>(mut self, key: impl Into<String>, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(key, value);
        self
    }

    /// Check if anything is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Fetch the value registered under `key` as `Arc<T>`
    pub fn get<T>(&self, key: &str) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let boxed = self.entries.get(key).ok_or_else(|| ContainerError::NotFound {
            namespace: self.name.clone(),
            key: key.to_string(),
        })?;

        boxed
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| ContainerError::TypeMismatch {
                namespace: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("keys", &self.keys())
            .finish()
    }
}

/// All application containers, keyed by namespace name
#[derive(Debug, Default)]
pub struct Registry {
    containers: HashMap<String, Arc<Container>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully populated container, replacing one with the same name
    pub fn register(&mut self, container: Container) {
        self.containers
            .insert(container.name().to_string(), Arc::new(container));
    }

    /// Builder: add a container
    pub fn with_container(mut self, container: Container) -> Self {
        self.register(container);
        self
    }

    /// Check if a namespace has been registered
    pub fn has_container(&self, namespace: &str) -> bool {
        self.containers.contains_key(namespace)
    }

    /// Get the container for a namespace
    pub fn container(&self, namespace: &str) -> Result<Arc<Container>, ContainerError> {
        self.containers
            .get(namespace)
            .cloned()
            .ok_or_else(|| ContainerError::UnknownNamespace(namespace.to_string()))
    }

    /// Fetch `key` from the container of `namespace`
    pub fn get<T>(&self, namespace: &str, key: &str) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.containers
            .get(namespace)
            .ok_or_else(|| ContainerError::UnknownNamespace(namespace.to_string()))?
            .get::<T>(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_register_and_get_concrete() {
        let mut container = Container::new("foo");
        container.register("answer", Arc::new(42_u32));

        assert!(container.contains("answer"));
        assert_eq!(*container.get::<u32>("answer").unwrap(), 42);
    }

    #[test]
    fn test_register_trait_object() {
        let container = Container::new("foo").with::<dyn Greeter>("greeter", Arc::new(English));

        let greeter = container.get::<dyn Greeter>("greeter").unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_register_closure() {
        type Doubler = dyn Fn(i64) -> i64 + Send + Sync;
        let f: Arc<Doubler> = Arc::new(|x: i64| x * 2);
        let container = Container::new("foo").with::<Doubler>("double", f);

        let double = container.get::<Doubler>("double").unwrap();
        assert_eq!(double(21), 42);
    }

    #[test]
    fn test_missing_key() {
        let container = Container::new("foo");
        let err = container.get::<u32>("nope").unwrap_err();
        assert_eq!(
            err,
            ContainerError::NotFound {
                namespace: "foo".to_string(),
                key: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_type_mismatch() {
        let container = Container::new("foo").with("answer", Arc::new(42_u32));
        let err = container.get::<String>("answer").unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = Registry::new()
            .with_container(Container::new("foo").with("answer", Arc::new(1_u8)))
            .with_container(Container::new("bar").with("answer", Arc::new(2_u8)));

        assert!(registry.has_container("foo"));
        assert_eq!(*registry.get::<u8>("foo", "answer").unwrap(), 1);
        assert_eq!(*registry.get::<u8>("bar", "answer").unwrap(), 2);

        let err = registry.get::<u8>("baz", "answer").unwrap_err();
        assert_eq!(err, ContainerError::UnknownNamespace("baz".to_string()));
    }
}
