//! Commands run against a bootstrapped namespace

use clap::{Args, Subcommand};
use criteria::{Criteria, SortDir};
use serde_json::Value;

use crate::bootstrap::App;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List mapped entities and their attributes
    Entities,
    /// Check whether a matching entity exists
    Exists(ExistsCommand),
    /// Query stored entities
    Query(QueryCommand),
}

#[derive(Debug, Args)]
pub struct ExistsCommand {
    /// Entity key, e.g. shop.order
    pub entity: String,
    /// Relative attribute path
    pub attr: String,
    /// Value, parsed as JSON when possible
    pub value: String,
}

#[derive(Debug, Args)]
pub struct QueryCommand {
    /// Entity key, e.g. shop.order
    pub entity: String,
    /// Filter expression, e.g. "status = 'open' and total > 10"
    #[arg(short, long)]
    pub filter: Option<String>,
    /// Order by attribute, `attr` or `attr:desc`
    #[arg(short, long)]
    pub order: Vec<String>,
    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl Command {
    pub fn run(&self, app: &App) -> anyhow::Result<()> {
        match self {
            Command::Entities => {
                for entity_name in app.map().entity_names() {
                    println!("{}", entity_name);
                    for entry in app.map().entity(entity_name).into_iter().flat_map(|e| e.values()) {
                        let storage: Vec<String> = entry
                            .storage_classes()
                            .map(|(kind, class)| format!("{}:{}", kind, class))
                            .collect();
                        println!(
                            "  {} -> {}{} [{}]",
                            entry.domain_attr(),
                            entry.storage_attr(),
                            if entry.is_computed() { " (computed)" } else { "" },
                            storage.join(", ")
                        );
                    }
                }
            }
            Command::Exists(cmd) => {
                let found = app
                    .runner()
                    .exists(&cmd.entity, [(cmd.attr.as_str(), parse_value(&cmd.value))])?;
                println!("{}", found);
            }
            Command::Query(cmd) => {
                for entity in app.runner().query(&cmd.criteria()?)? {
                    println!("{}", entity.to_value().unwrap_or(Value::Null));
                }
            }
        }
        Ok(())
    }
}

impl QueryCommand {
    pub fn criteria(&self) -> anyhow::Result<Criteria> {
        let mut criteria = Criteria::new(&self.entity)?;
        if let Some(filter) = &self.filter {
            criteria = criteria.with_filter_str(filter)?;
        }
        for order in &self.order {
            criteria = match order.rsplit_once(':') {
                Some((attr, dir)) if dir.eq_ignore_ascii_case("desc") => criteria.with_order(attr, SortDir::Desc),
                Some((attr, dir)) if dir.eq_ignore_ascii_case("asc") => criteria.with_order(attr, SortDir::Asc),
                Some((_, dir)) => anyhow::bail!("unknown sort direction: {}", dir),
                None => criteria.with_order(order.as_str(), SortDir::Asc),
            };
        }
        if let Some(limit) = self.limit {
            criteria = criteria.with_limit(limit);
        }
        Ok(criteria)
    }
}

/// JSON literal when it parses as one, plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
