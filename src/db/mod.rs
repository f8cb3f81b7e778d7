pub mod pool;

use libsql::params::IntoParams;
use libsql::{Connection, Row};

use crate::error::AppResult;

pub use pool::create_database;

const SCHEMA: &str = include_str!("schema.sql");

/// Creates any missing tables and indexes.
pub async fn migrate(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA).await?;
    Ok(())
}

pub async fn fetch_all<T>(
    conn: &Connection,
    sql: &str,
    params: impl IntoParams,
    from_row: fn(&Row) -> Result<T, libsql::Error>,
) -> AppResult<Vec<T>> {
    let mut rows = conn.query(sql, params).await?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(from_row(&row)?);
    }
    Ok(out)
}

pub async fn fetch_optional<T>(
    conn: &Connection,
    sql: &str,
    params: impl IntoParams,
    from_row: fn(&Row) -> Result<T, libsql::Error>,
) -> AppResult<Option<T>> {
    let mut rows = conn.query(sql, params).await?;

    match rows.next().await? {
        Some(row) => Ok(Some(from_row(&row)?)),
        None => Ok(None),
    }
}

/// Reads the first column of the first row as an integer, treating NULL as 0.
pub async fn fetch_i64(conn: &Connection, sql: &str, params: impl IntoParams) -> AppResult<i64> {
    let mut rows = conn.query(sql, params).await?;

    match rows.next().await? {
        Some(row) => {
            let value: Option<i64> = row.get(0)?;
            Ok(value.unwrap_or(0))
        }
        None => Ok(0),
    }
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
