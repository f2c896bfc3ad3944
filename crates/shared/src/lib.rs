//! # Stratum Shared
//!
//! Common types used across all Stratum crates: the error taxonomy, the
//! namespace-scoped container registry, domain name qualification and the
//! attribute-reader contract domain objects implement.

pub mod container;
pub mod domain;
pub mod domain_name;
pub mod error;

// Re-exports
pub use container::*;
pub use domain::*;
pub use domain_name::*;
pub use error::*;
