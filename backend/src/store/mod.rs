pub mod migrations;
pub mod records;
pub mod types;

#[cfg(test)]
mod tests;

pub use types::{Record, RecordType, TypeCount};

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, Transaction};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{DataError, Result};

/// How long a caller waits for the connection before giving up
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Versioned key/value access to the `portfolio_data` table.
///
/// A single connection behind an async mutex: every call, and every
/// transaction as a whole, runs with exclusive access.
#[derive(Clone)]
pub struct PortfolioStore {
    db: Arc<Mutex<Connection>>,
}

impl PortfolioStore {
    /// Open (or create) the store at `path` and apply migrations
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Could not create store directory {}: {}", parent.display(), e);
            }
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::apply_migrations(&conn)?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    async fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        tokio::time::timeout(LOCK_TIMEOUT, self.db.lock())
            .await
            .map_err(|_| DataError::LockTimeout)
    }

    /// Run `f` inside one SQLite transaction: committed on `Ok`, rolled back on `Err`
    pub async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut db = self.lock().await?;
        let tx = db.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Lightweight connectivity probe
    pub async fn health_check(&self) -> bool {
        let db = match self.lock().await {
            Ok(db) => db,
            Err(e) => {
                log::warn!("Store health check failed: {}", e);
                return false;
            }
        };

        match db.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Store health check failed: {}", e);
                false
            }
        }
    }

    pub async fn get_active(&self, key: &str) -> Result<Option<Value>> {
        let db = self.lock().await?;
        records::get_active(&db, key)
    }

    pub async fn list_active_by_type(&self, record_type: RecordType) -> Result<Vec<Value>> {
        let db = self.lock().await?;
        records::list_active_by_type(&db, record_type)
    }

    pub async fn list_active_records_by_type(&self, record_type: RecordType) -> Result<Vec<Record>> {
        let db = self.lock().await?;
        records::list_active_records_by_type(&db, record_type)
    }

    pub async fn set_active(&self, key: &str, record_type: RecordType, value: &Value) -> Result<Record> {
        self.transaction(|tx| records::set_active(tx, key, record_type, value))
            .await
    }

    pub async fn deactivate(&self, key: &str) -> Result<Option<Record>> {
        let db = self.lock().await?;
        records::deactivate(&db, key)
    }

    pub async fn list_history(&self, key: &str) -> Result<Vec<Record>> {
        let db = self.lock().await?;
        records::list_history(&db, key)
    }

    pub async fn activate_version(&self, key: &str, version: i64) -> Result<Record> {
        self.transaction(|tx| records::activate_version(tx, key, version))
            .await
    }

    pub async fn counts_by_type(&self) -> Result<BTreeMap<RecordType, TypeCount>> {
        let db = self.lock().await?;
        records::counts_by_type(&db)
    }
}
