//! # Stratum Repository
//!
//! ```text
//! caller ──▶ RepositoryRunner ──▶ RepositoryTable["<Ns>::<Name>Repository"]
//!                                        │
//!                                        ▼
//!                                   Repository ──▶ Mapper ──▶ storage class
//!                                        │
//!                                        ▼
//!                      RepositoryBase::build (presenter or domain constructor)
//! ```
//!
//! Repositories are registered explicitly during application assembly and
//! looked up by their composed type name at call time.

pub mod base;
pub mod repository;
pub mod runner;
pub mod table;

pub use base::{DomainConstructor, EntityBuilder, RepositoryBase};
pub use repository::{EntityCollection, Repository};
pub use runner::RepositoryRunner;
pub use table::{RepositoryFactory, RepositoryHandle, RepositoryTable};
