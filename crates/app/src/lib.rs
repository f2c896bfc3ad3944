//! Stratum application wiring and commands

pub mod bootstrap;
pub mod commands;

pub use bootstrap::{App, SeedRecord};
pub use commands::Command;
