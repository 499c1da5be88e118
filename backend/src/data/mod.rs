pub mod join;
pub mod models;

mod experiences;
mod profile;
mod projects;
mod skills;
mod stats;

#[cfg(test)]
mod tests;

pub use models::*;

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DataError, Result};
use crate::store::{records, PortfolioStore, Record, RecordType, TypeCount};

/// One durable key mutation made by a write, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Upsert { key: String, item: PortfolioItem },
    Remove { key: String },
}

impl Change {
    pub fn key(&self) -> &str {
        match self {
            Change::Upsert { key, .. } | Change::Remove { key } => key,
        }
    }
}

/// Result of a write: the domain value plus every key it touched
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub value: T,
    pub changes: Vec<Change>,
}

impl<T> Applied<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            value: f(self.value),
            changes: self.changes,
        }
    }
}

/// Entity-shaped operations on top of the versioned store
#[derive(Clone)]
pub struct PortfolioData {
    store: PortfolioStore,
}

impl PortfolioData {
    pub fn new(store: PortfolioStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PortfolioStore {
        &self.store
    }

    /// Run a compound write in one transaction, collecting the keys it touches
    pub(crate) async fn write<T, F>(&self, f: F) -> Result<Applied<T>>
    where
        F: FnOnce(&mut DataTx<'_>) -> Result<T>,
    {
        self.store
            .transaction(|tx| {
                let mut writer = DataTx::new(tx);
                let value = f(&mut writer)?;
                Ok(Applied {
                    value,
                    changes: writer.changes,
                })
            })
            .await
    }

    /// Read several record types against one consistent snapshot
    pub(crate) async fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DataTx<'_>) -> Result<T>,
    {
        self.store
            .transaction(|tx| {
                let reader = DataTx::new(tx);
                f(&reader)
            })
            .await
    }
}

/// Typed view over a connection that records every write it performs
pub(crate) struct DataTx<'a> {
    conn: &'a Connection,
    changes: Vec<Change>,
}

impl<'a> DataTx<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            changes: Vec::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match records::get_active(self.conn, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn get_value(&self, key: &str) -> Result<Option<Value>> {
        records::get_active(self.conn, key)
    }

    pub fn list<T: DeserializeOwned>(&self, record_type: RecordType) -> Result<Vec<T>> {
        records::list_active_by_type(self.conn, record_type)?
            .into_iter()
            .map(|value| Ok(serde_json::from_value(value)?))
            .collect()
    }

    pub fn list_records(&self, record_type: RecordType) -> Result<Vec<Record>> {
        records::list_active_records_by_type(self.conn, record_type)
    }

    pub fn counts(&self) -> Result<BTreeMap<RecordType, TypeCount>> {
        records::counts_by_type(self.conn)
    }

    pub fn history(&self, key: &str) -> Result<Vec<Record>> {
        records::list_history(self.conn, key)
    }

    pub fn put(&mut self, key: &str, item: PortfolioItem) -> Result<Record> {
        let value = item.to_value()?;
        let record = records::set_active(self.conn, key, item.record_type(), &value)?;
        self.changes.push(Change::Upsert {
            key: key.to_string(),
            item,
        });
        Ok(record)
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Record>> {
        let removed = records::deactivate(self.conn, key)?;
        if removed.is_some() {
            self.changes.push(Change::Remove {
                key: key.to_string(),
            });
        }
        Ok(removed)
    }

    pub fn activate_version(&mut self, key: &str, version: i64) -> Result<Record> {
        let record = records::activate_version(self.conn, key, version)?;
        let item = PortfolioItem::from_record(&record)?;
        self.changes.push(Change::Upsert {
            key: key.to_string(),
            item,
        });
        Ok(record)
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DataError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Shallow-merge the fields of `patch` over `existing`, leaving `protected`
/// fields as they were
pub(crate) fn merge_patch(existing: &mut Value, patch: &Value, protected: &[&str]) -> Result<()> {
    let Some(patch) = patch.as_object() else {
        return Err(DataError::InvalidInput("patch must be a JSON object".to_string()));
    };
    let Some(target) = existing.as_object_mut() else {
        return Err(DataError::InvalidInput("stored value is not a JSON object".to_string()));
    };

    for (field, value) in patch {
        if protected.contains(&field.as_str()) {
            continue;
        }
        target.insert(field.clone(), value.clone());
    }

    Ok(())
}

/// Decode a merged value back into its typed form; type mismatches in the
/// patch are the caller's fault
pub(crate) fn decode_patched<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| DataError::InvalidInput(e.to_string()))
}
