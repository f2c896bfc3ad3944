//! In-Memory Repository
//!
//! Serves one entity from [`InMemoryStorage`] tables. The entity's primary
//! class holds its first attribute mapped for memory storage; every other
//! class is secondary. Each written row carries the entity's key column, and
//! reads join the secondary rows onto the primary ones by that key:
//!
//! ```text
//! orders     {order_id: 1, order_status: open}  ─┐
//! shipments  {order_id: 1, ship_city: Oslo}     ─┴─▶ {order_id, order_status, ship_city}
//! ```
//!
//! Filter and order attributes are translated to storage columns through
//! the mapper.

use std::cmp::Ordering;
use std::sync::Arc;

use criteria::{compare_values, Criteria, ExistsCriteria, Expr, SortDir};
use mapping::MappingEntry;
use repository::{EntityCollection, Repository, RepositoryBase};
use serde_json::Value;
use shared::{DomainObject, Inputs, Result, StorageRow, StratumError};
use tracing::debug;

use crate::storage::{InMemoryStorage, MEMORY};

/// Primary class and key column of an entity's memory mapping
///
/// The key is the column of the `id` attribute when the primary class
/// stores one, otherwise the column of the primary attribute itself.
pub fn primary_key<'a, I>(entries: I) -> Option<(&'a str, &'a str)>
where
    I: IntoIterator<Item = &'a MappingEntry>,
    I::IntoIter: Clone,
{
    let entries = entries.into_iter().filter(|entry| entry.is_storage(MEMORY));
    let primary = entries.clone().next()?;
    let class_name = primary.storage(MEMORY)?;
    let key = entries
        .filter(|entry| entry.storage(MEMORY) == Some(class_name))
        .find(|entry| entry.domain_attr() == "id")
        .unwrap_or(primary);
    Some((class_name, key.storage_attr()))
}

/// Storages of one entity, resolved before any row is read or written
struct StorageLayout {
    key_column: String,
    /// Primary class first
    classes: Vec<(String, Arc<InMemoryStorage>)>,
}

pub struct InMemoryRepository {
    base: RepositoryBase,
    domain_name: String,
}

impl InMemoryRepository {
    pub fn new(base: RepositoryBase, domain_name: impl Into<String>) -> Self {
        Self {
            base,
            domain_name: domain_name.into(),
        }
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    fn ensure_domain(&self, domain_name: &str, action: &str) -> Result<()> {
        if domain_name != self.domain_name {
            return Err(StratumError::Storage(format!(
                "Repository for ({}) can not {} ({})",
                self.domain_name, action, domain_name
            )));
        }
        Ok(())
    }

    fn layout(&self) -> Result<StorageLayout> {
        let entries = self.mapper().each_entity_attr(&self.domain_name)?;
        let (_, key_column) = primary_key(entries.clone()).ok_or_else(|| {
            StratumError::Storage(format!("Entity ({}) has no {} storage", self.domain_name, MEMORY))
        })?;

        let mut classes: Vec<(String, Arc<InMemoryStorage>)> = Vec::new();
        for entry in entries {
            let Some(class_name) = entry.storage(MEMORY) else {
                continue;
            };
            if classes.iter().any(|(name, _)| name == class_name) {
                continue;
            }
            let storage = self.mapper().storage_class_from_entry::<InMemoryStorage>(entry, MEMORY)?;
            classes.push((class_name.to_string(), storage));
        }

        Ok(StorageLayout {
            key_column: key_column.to_string(),
            classes,
        })
    }

    /// Primary rows with the matching secondary rows merged in
    fn joined_rows(&self) -> Result<Vec<StorageRow>> {
        let layout = self.layout()?;
        let Some(((_, primary), secondaries)) = layout.classes.split_first() else {
            return Ok(Vec::new());
        };

        let mut rows = primary.rows()?;
        for (_, storage) in secondaries {
            let secondary_rows = storage.rows()?;
            for row in rows.iter_mut() {
                let Some(key) = row.get(&layout.key_column).cloned() else {
                    continue;
                };
                let Some(found) = secondary_rows.iter().find(|r| r.get(&layout.key_column) == Some(&key)) else {
                    continue;
                };
                for (column, value) in found {
                    row.entry(column.clone()).or_insert_with(|| value.clone());
                }
            }
        }
        Ok(rows)
    }

    /// Storage column of a relative domain attribute
    fn column(&self, domain_attr: &str) -> Result<String> {
        let entry = self.mapper().find(&self.domain_name, domain_attr)?;
        if !entry.is_storage(MEMORY) {
            return Err(StratumError::Storage(format!(
                "Attribute ({}) of ({}) has no {} storage",
                domain_attr, self.domain_name, MEMORY
            )));
        }
        Ok(entry.storage_attr().to_string())
    }

    fn cell<'a>(row: &'a StorageRow, column: &str) -> &'a Value {
        row.get(column).unwrap_or(&Value::Null)
    }
}

impl Repository for InMemoryRepository {
    fn base(&self) -> &RepositoryBase {
        &self.base
    }

    fn exists(&self, criteria: &ExistsCriteria) -> Result<bool> {
        self.ensure_domain(criteria.domain_name(), "check")?;
        let rows = self.joined_rows()?;
        let Some(expr) = criteria.filters() else {
            return Ok(!rows.is_empty());
        };

        let column = self.column(&expr.relative_attr(criteria.domain()))?;
        Ok(rows.iter().any(|row| expr.matches(Self::cell(row, &column))))
    }

    fn query(&self, criteria: &Criteria) -> Result<EntityCollection> {
        self.ensure_domain(criteria.domain_name(), "query")?;
        let mut rows = Vec::new();
        for row in self.joined_rows()? {
            let keep = match criteria.filters() {
                Some(filter) => filter.evaluate(&|expr: &Expr| {
                    let column = self.column(&expr.relative_attr(criteria.domain()))?;
                    Ok(expr.matches(Self::cell(&row, &column)))
                })?,
                None => true,
            };
            if keep {
                rows.push(row);
            }
        }

        let order = criteria
            .order()
            .iter()
            .map(|order| Ok((self.column(&order.attr)?, order.dir)))
            .collect::<Result<Vec<_>>>()?;
        if !order.is_empty() {
            rows.sort_by(|a, b| {
                for (column, dir) in &order {
                    let ordering = compare_values(Self::cell(a, column), Self::cell(b, column))
                        .unwrap_or(Ordering::Equal);
                    let ordering = match dir {
                        SortDir::Asc => ordering,
                        SortDir::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = criteria.limit() {
            rows.truncate(limit);
        }

        debug!(entity = %self.domain_name, found = rows.len(), "Query executed");
        rows.iter()
            .map(|row| self.build(&self.domain_name, row, MEMORY, &Inputs::new()))
            .collect()
    }

    fn persist(&self, entity: &dyn DomainObject) -> Result<()> {
        self.ensure_domain(entity.domain_name(), "persist")?;

        let layout = self.layout()?;
        let by_class = self.mapper().to_storage_by_class(entity, MEMORY)?;
        let key = layout
            .classes
            .first()
            .and_then(|(primary, _)| by_class.get(primary))
            .and_then(|row| row.get(&layout.key_column))
            .cloned();

        let mut writes = Vec::with_capacity(layout.classes.len());
        for (class_name, storage) in &layout.classes {
            let Some(row) = by_class.get(class_name) else {
                continue;
            };
            let mut row = row.clone();
            if let Some(key) = &key {
                row.entry(layout.key_column.clone()).or_insert_with(|| key.clone());
            }
            writes.push((class_name, storage, row));
        }

        for (class_name, storage, row) in writes {
            storage.insert_by(Some(layout.key_column.as_str()), row)?;
            debug!(entity = %self.domain_name, storage = %class_name, "Row persisted");
        }
        Ok(())
    }
}
