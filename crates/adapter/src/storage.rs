//! In-Memory Storage
//!
//! A named table of storage rows. Instances are registered in a namespace
//! container under `persistence.memory.<name>` and located through the
//! mapper like any other storage class.

use std::sync::RwLock;

use shared::{Result, StorageRow, StratumError};

/// Storage type handled by this adapter
pub const MEMORY: &str = "memory";

/// Thread-safe row table using RwLock
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    name: String,
    key_column: Option<String>,
    rows: RwLock<Vec<StorageRow>>,
}

impl InMemoryStorage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_column: None,
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Builder: rows sharing a value in `column` replace each other
    pub fn with_key(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Container key this storage is registered under
    pub fn container_key(name: &str) -> String {
        format!("persistence.{}.{}", MEMORY, name)
    }

    /// Append a row, or replace the row with the same key
    pub fn insert(&self, row: StorageRow) -> Result<()> {
        self.insert_by(self.key_column.as_deref(), row)
    }

    /// Append a row, or replace the row holding the same value in `key_column`
    pub fn insert_by(&self, key_column: Option<&str>, row: StorageRow) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StratumError::Storage("Failed to acquire write lock".to_string()))?;

        if let Some(column) = key_column {
            if let Some(key) = row.get(column).cloned() {
                if let Some(existing) = rows.iter_mut().find(|r| r.get(column) == Some(&key)) {
                    *existing = row;
                    return Ok(());
                }
            }
        }
        rows.push(row);
        Ok(())
    }

    /// Snapshot of all rows in insertion order
    pub fn rows(&self) -> Result<Vec<StorageRow>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StratumError::Storage("Failed to acquire read lock".to_string()))?;
        Ok(rows.clone())
    }

    pub fn len(&self) -> Result<usize> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StratumError::Storage("Failed to acquire read lock".to_string()))?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ========== Getters ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }
}
