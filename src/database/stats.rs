use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Bumps a named counter and returns its new value.
pub fn increment(conn: &Connection, name: &str) -> Result<i64> {
    let sql = "INSERT INTO stats (name, value) VALUES (?1, 1) ON CONFLICT(name) DO UPDATE SET value = value + 1 RETURNING value";

    conn.query_row(sql, params![name], |row| row.get(0))
        .with_context(|| format!("Failed to increment counter {}", name))
}

pub fn get(conn: &Connection, name: &str) -> Result<i64> {
    let value: Option<i64> = conn
        .query_row("SELECT value FROM stats WHERE name = ?1", params![name], |row| row.get(0))
        .optional()
        .context("Failed to read counter")?;
    Ok(value.unwrap_or(0))
}

pub fn set(conn: &Connection, name: &str, value: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO stats (name, value) VALUES (?1, ?2) ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, value],
    )
    .context("Failed to set counter")
    .map(|_| ())
}

pub fn list_all(conn: &Connection) -> Result<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare("SELECT name, value FROM stats")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup, TOTAL_PLAYED};

    #[test]
    fn test_counters() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::ensure_schema(&mut conn).unwrap();

        assert_eq!(get(&conn, TOTAL_PLAYED).unwrap(), 0);
        assert_eq!(increment(&conn, TOTAL_PLAYED).unwrap(), 1);
        assert_eq!(increment(&conn, TOTAL_PLAYED).unwrap(), 2);

        set(&conn, TOTAL_PLAYED, 0).unwrap();
        assert_eq!(get(&conn, TOTAL_PLAYED).unwrap(), 0);
        assert_eq!(list_all(&conn).unwrap().get(TOTAL_PLAYED), Some(&0));
    }
}
