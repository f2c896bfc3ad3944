//! # Stratum Mapping
//!
//! Records how each domain attribute of an entity corresponds to a storage
//! attribute and storage class, and translates values in both directions.
//!
//! ```text
//! domain object ──to_storage──▶ { storage_attr: value, .. }
//!      ▲                                   │
//!      └──── to_entity_hash (nested) ◀─────┘
//! ```

pub mod config;
pub mod entry;
pub mod map;
pub mod mapper;

pub use config::{EntryDefinition, MappingConfig};
pub use entry::MappingEntry;
pub use map::EntityMap;
pub use mapper::{EntityValue, Mapper};
