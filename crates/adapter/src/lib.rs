//! # Stratum Adapter Layer
//!
//! Storage implementations behind the repository contract.
//!
//! ## Structure
//!
//! - `storage` - In-memory storage classes registered in a namespace container
//! - `repository/` - Repository implementations over those storages

pub mod repository;
pub mod storage;

pub use self::repository::in_memory::{primary_key, InMemoryRepository};
pub use self::storage::{InMemoryStorage, MEMORY};
