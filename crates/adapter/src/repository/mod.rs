//! Repository Adapters - Implementations of the repository contract

pub mod in_memory;
