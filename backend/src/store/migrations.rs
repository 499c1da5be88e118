use rusqlite::Connection;

use crate::error::Result;

pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

pub fn get_store_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "create_portfolio_data",
        sql: include_str!("sql/001_portfolio_data.sql"),
    }]
}

/// Apply every migration newer than the database's `user_version`
pub fn apply_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    for migration in get_store_migrations() {
        if migration.version <= current {
            continue;
        }

        log::info!(
            "Applying store migration {} ({})",
            migration.version,
            migration.description
        );
        conn.execute_batch(migration.sql)?;
        conn.pragma_update(None, "user_version", migration.version)?;
    }

    Ok(())
}
