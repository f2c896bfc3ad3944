//! Stratum - Domain/storage mapping over in-memory repositories
//!
//! Usage:
//!   stratum entities                                  - List mapped entities
//!   stratum --seed config/seed.json exists shop.order id 1
//!   stratum --seed config/seed.json query shop.order -f "status = 'open'" -o total:desc
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Wiring                                   │
//! │    │                                                            │
//! │    ├── Loads: mapping file -> EntityMap (mapping)               │
//! │    ├── Creates: Registry + namespace Container (shared)         │
//! │    ├── Creates: InMemoryStorage / InMemoryRepository (adapter)  │
//! │    └── Runs: RepositoryRunner (repository)                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use app::{App, Command};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "stratum")]
#[command(about = "Stratum - Map domain objects onto storage rows")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Mapping definition file (.yaml, .yml or .json)
    #[arg(short, long, global = true, default_value = "config/mappings.yaml")]
    mappings: PathBuf,

    /// Namespace the mappings are registered in
    #[arg(short, long, global = true, default_value = "shop")]
    namespace: String,

    /// JSON file of entities persisted before running the command
    #[arg(short, long, global = true)]
    seed: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let app = App::from_mapping_file(&cli.namespace, &cli.mappings)?;
    if let Some(seed) = &cli.seed {
        let count = app.seed_from_file(seed)?;
        info!("Persisted {} seed records into {}", count, app.namespace());
    }

    cli.command.run(&app)
}
