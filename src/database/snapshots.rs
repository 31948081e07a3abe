use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Writes a consistent copy of the whole database to `target`.
pub fn write_snapshot(conn: &Connection, target: &Path) -> Result<()> {
    let target = target.to_string_lossy();
    conn.execute("VACUUM INTO ?1", params![target])
        .with_context(|| format!("Failed to write snapshot to {}", target))
        .map(|_| ())
}

/// Replaces games, history and counters with the contents of a snapshot file.
/// Genres and settings are left alone.
pub fn restore_snapshot(conn: &mut Connection, source: &Path) -> Result<()> {
    let source = source.to_string_lossy();
    conn.execute("ATTACH DATABASE ?1 AS snapshot", params![source])
        .with_context(|| format!("Failed to attach snapshot {}", source))?;

    let copied = copy_tables(conn);

    conn.execute("DETACH DATABASE snapshot", [])
        .context("Failed to detach snapshot")?;
    copied
}

fn copy_tables(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DELETE FROM main.games;
         INSERT INTO main.games (appid, title, image_url, image_path, rating, wins, losses, played)
             SELECT appid, title, image_url, image_path, rating, wins, losses, played FROM snapshot.games;
         DELETE FROM main.history;
         INSERT INTO main.history (winner, loser, r_w_before, r_l_before, r_w_after, r_l_after, k, is_pass, recorded_at)
             SELECT winner, loser, r_w_before, r_l_before, r_w_after, r_l_after, k, is_pass, recorded_at FROM snapshot.history ORDER BY id;
         DELETE FROM main.stats;
         INSERT INTO main.stats (name, value) SELECT name, value FROM snapshot.stats;",
    )
    .context("Failed to copy snapshot tables")?;
    tx.commit().context("Failed to commit restore")
}
