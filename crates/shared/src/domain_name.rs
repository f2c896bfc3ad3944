//! Domain names and container key qualification
//!
//! Entities are named `<feature>.<entity>` or `global.<entity>`. A bare
//! `<entity>` is treated as global. Every container key and qualified
//! attribute path derived from a domain name goes through this type so the
//! two shapes never drift apart:
//!
//! ```text
//! shop.order   -> features.shop.<kind>.order    [features, shop, order, <attr>..]
//! global.user  -> global.<kind>.user            [global, user, <attr>..]
//! ```

use crate::error::{Result, StratumError};

const GLOBAL: &str = "global";
const FEATURES: &str = "features";

/// A parsed entity name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    name: String,
    feature: Option<String>,
    basename: String,
}

impl DomainName {
    /// Parse `feature.entity`, `global.entity` or `entity`
    pub fn parse(name: &str) -> Result<Self> {
        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(StratumError::InvalidDomainName(name.to_string()));
        }

        let (feature, basename) = match segments.as_slice() {
            [basename] => (None, *basename),
            [GLOBAL, basename] => (None, *basename),
            [feature, basename] => (Some(feature.to_string()), *basename),
            _ => return Err(StratumError::InvalidDomainName(name.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            feature,
            basename: basename.to_string(),
        })
    }

    /// The name as given
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Feature owning the entity, `None` for global entities
    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    /// Entity name without its feature
    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn is_global(&self) -> bool {
        self.feature.is_none()
    }

    /// Container key for a kind of registration
    ///
    /// `shop.order` with kind `presenters.db` gives
    /// `features.shop.presenters.db.order`.
    pub fn qualify(&self, kind: &str) -> String {
        match &self.feature {
            Some(feature) => format!("{}.{}.{}.{}", FEATURES, feature, kind, self.basename),
            None => format!("{}.{}.{}", GLOBAL, kind, self.basename),
        }
    }

    /// Fully qualified attribute list for a relative attribute path
    pub fn qualify_attr<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        let mut list = match &self.feature {
            Some(feature) => vec![FEATURES.to_string(), feature.clone(), self.basename.clone()],
            None => vec![GLOBAL.to_string(), self.basename.clone()],
        };
        list.extend(path.iter().map(|s| s.as_ref().to_string()));
        list
    }

    /// Number of leading segments `qualify_attr` adds
    pub fn qualifier_len(&self) -> usize {
        if self.is_global() {
            2
        } else {
            3
        }
    }

    /// Check if an attribute path already starts with this domain's qualifier
    ///
    /// Only the domain's own prefix counts, so `shop.order` may still map an
    /// attribute named `global.enabled`.
    pub fn is_qualified_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let qualifier = self.qualify_attr::<&str>(&[]);
        path.len() >= qualifier.len() && path.iter().zip(&qualifier).all(|(segment, q)| segment.as_ref() == q)
    }

    /// Type name of the repository serving this entity
    ///
    /// `shop.order_line` gives `OrderLineRepository`.
    pub fn repo_name(&self) -> String {
        format!("{}Repository", camelize(&self.basename))
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// `order_line` -> `OrderLine`
pub fn camelize(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
