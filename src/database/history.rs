use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::domain::HistoryEntry;

const HISTORY_COLUMNS: &str = "winner, loser, r_w_before, r_l_before, r_w_after, r_l_after, k, is_pass, recorded_at";

pub fn append_entry(conn: &Connection, entry: &HistoryEntry) -> Result<()> {
    let sql = format!("INSERT INTO history ({HISTORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)");

    conn.execute(
        &sql,
        params![
            entry.winner,
            entry.loser,
            entry.r_w_before,
            entry.r_l_before,
            entry.r_w_after,
            entry.r_l_after,
            entry.k,
            entry.is_pass,
            entry.recorded_at
        ],
    )
    .context("Failed to append history entry")
    .map(|_| ())
}

fn parse_history_row(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        winner: row.get(0)?,
        loser: row.get(1)?,
        r_w_before: row.get(2)?,
        r_l_before: row.get(3)?,
        r_w_after: row.get(4)?,
        r_l_after: row.get(5)?,
        k: row.get(6)?,
        is_pass: row.get(7)?,
        recorded_at: row.get(8)?,
    })
}

/// Every entry, oldest first.
pub fn list_all(conn: &Connection) -> Result<Vec<HistoryEntry>> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM history ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_history_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// The last `limit` entries, oldest first.
pub fn list_recent(conn: &Connection, limit: usize) -> Result<Vec<HistoryEntry>> {
    let sql = format!(
        "SELECT {HISTORY_COLUMNS} FROM (SELECT id, {HISTORY_COLUMNS} FROM history ORDER BY id DESC LIMIT ?1) ORDER BY id"
    );
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit], parse_history_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Entries where the game was either side, oldest first.
pub fn list_for_game(conn: &Connection, appid: &str) -> Result<Vec<HistoryEntry>> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM history WHERE winner = ?1 OR loser = ?1 ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![appid], parse_history_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn clear(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM history", [])
        .context("Failed to clear history")
}
