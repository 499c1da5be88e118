// Synchronous record operations against a borrowed connection.
//
// Every function takes `&Connection` so the same code runs standalone or
// inside a `rusqlite::Transaction` (which derefs to `Connection`).
use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::types::{Record, RecordType, TypeCount};
use crate::error::{DataError, Result};

const RECORD_COLUMNS: &str =
    "id, key, type, value, version, is_active, created_at, updated_at";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<(Record, String, String)> {
    // value and type are decoded outside the row closure so decode errors
    // are reported as serialization errors, not SQL errors
    let type_str: String = row.get(2)?;
    let value_str: String = row.get(3)?;
    Ok((
        Record {
            id: row.get(0)?,
            key: row.get(1)?,
            record_type: RecordType::Profile,
            value: Value::Null,
            version: row.get(4)?,
            is_active: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        },
        type_str,
        value_str,
    ))
}

fn decode((mut record, type_str, value_str): (Record, String, String)) -> Result<Record> {
    record.record_type = RecordType::parse(&type_str).ok_or_else(|| {
        DataError::InvalidInput(format!(
            "unknown record type '{}' for key {}",
            type_str, record.key
        ))
    })?;
    record.value = serde_json::from_str(&value_str)?;
    Ok(record)
}

/// Fetch the active record for `key`, if any
pub fn get_active_record(conn: &Connection, key: &str) -> Result<Option<Record>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {} FROM portfolio_data WHERE key = ?1 AND is_active = 1",
                RECORD_COLUMNS
            ),
            params![key],
            map_record,
        )
        .optional()?;

    raw.map(decode).transpose()
}

pub fn get_active(conn: &Connection, key: &str) -> Result<Option<Value>> {
    Ok(get_active_record(conn, key)?.map(|record| record.value))
}

/// All active records of one type, oldest first
pub fn list_active_records_by_type(conn: &Connection, record_type: RecordType) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM portfolio_data
         WHERE type = ?1 AND is_active = 1
         ORDER BY created_at ASC, id ASC",
        RECORD_COLUMNS
    ))?;

    let raw = stmt
        .query_map(params![record_type.as_str()], map_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.into_iter().map(decode).collect()
}

pub fn list_active_by_type(conn: &Connection, record_type: RecordType) -> Result<Vec<Value>> {
    Ok(list_active_records_by_type(conn, record_type)?
        .into_iter()
        .map(|record| record.value)
        .collect())
}

/// Deactivate the current version of `key` and insert `value` as the next one.
///
/// Two statements: callers that need atomicity with other writes run this
/// inside a transaction.
pub fn set_active(conn: &Connection, key: &str, record_type: RecordType, value: &Value) -> Result<Record> {
    let now = now();

    conn.execute(
        "UPDATE portfolio_data SET is_active = 0, updated_at = ?2
         WHERE key = ?1 AND is_active = 1",
        params![key, now],
    )?;

    let next_version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) + 1 FROM portfolio_data WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )?;

    conn.execute(
        "INSERT INTO portfolio_data (key, type, value, version, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
        params![
            key,
            record_type.as_str(),
            serde_json::to_string(value)?,
            next_version,
            now,
        ],
    )?;

    Ok(Record {
        id: conn.last_insert_rowid(),
        key: key.to_string(),
        record_type,
        value: value.clone(),
        version: next_version,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Mark the active record for `key` inactive and return it
pub fn deactivate(conn: &Connection, key: &str) -> Result<Option<Record>> {
    let Some(mut record) = get_active_record(conn, key)? else {
        return Ok(None);
    };

    let now = now();
    conn.execute(
        "UPDATE portfolio_data SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        params![record.id, now],
    )?;

    record.is_active = false;
    record.updated_at = now;
    Ok(Some(record))
}

/// Every version ever written for `key`, newest first
pub fn list_history(conn: &Connection, key: &str) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM portfolio_data WHERE key = ?1 ORDER BY version DESC",
        RECORD_COLUMNS
    ))?;

    let raw = stmt
        .query_map(params![key], map_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    raw.into_iter().map(decode).collect()
}

/// Make `(key, version)` the active record again
pub fn activate_version(conn: &Connection, key: &str, version: i64) -> Result<Record> {
    let target = conn
        .query_row(
            &format!(
                "SELECT {} FROM portfolio_data WHERE key = ?1 AND version = ?2",
                RECORD_COLUMNS
            ),
            params![key, version],
            map_record,
        )
        .optional()?;

    let Some(mut target) = target.map(decode).transpose()? else {
        return Err(DataError::VersionNotFound {
            key: key.to_string(),
            version,
        });
    };

    let now = now();
    conn.execute(
        "UPDATE portfolio_data SET is_active = 0, updated_at = ?2
         WHERE key = ?1 AND is_active = 1",
        params![key, now],
    )?;
    conn.execute(
        "UPDATE portfolio_data SET is_active = 1, updated_at = ?2 WHERE id = ?1",
        params![target.id, now],
    )?;

    target.is_active = true;
    target.updated_at = now;
    Ok(target)
}

pub fn counts_by_type(conn: &Connection) -> Result<BTreeMap<RecordType, TypeCount>> {
    let mut stmt = conn.prepare(
        "SELECT type, COUNT(*), MAX(updated_at) FROM portfolio_data
         WHERE is_active = 1
         GROUP BY type",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                TypeCount {
                    count: row.get(1)?,
                    last_updated: row.get(2)?,
                },
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut counts = BTreeMap::new();
    for (type_str, count) in rows {
        match RecordType::parse(&type_str) {
            Some(record_type) => {
                counts.insert(record_type, count);
            }
            None => log::warn!("Ignoring rows with unknown record type '{}'", type_str),
        }
    }

    Ok(counts)
}
