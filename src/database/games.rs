use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{Game, ImportEntry};

const GAME_COLUMNS: &str = "appid, title, image_url, image_path, rating, wins, losses, played";

pub fn upsert_game(conn: &Connection, game: &Game) -> Result<()> {
    let sql = "INSERT INTO games (appid, title, image_url, image_path, rating, wins, losses, played) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(appid) DO UPDATE SET title = excluded.title, image_url = excluded.image_url, image_path = excluded.image_path, rating = excluded.rating, wins = excluded.wins, losses = excluded.losses, played = excluded.played";

    conn.execute(
        sql,
        params![
            game.appid,
            game.title,
            game.image_url,
            game.image_path,
            game.rating,
            game.wins,
            game.losses,
            game.played
        ],
    )
    .with_context(|| format!("Failed to upsert game {}", game.appid))
    .map(|_| ())
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    Ok(Game {
        appid: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        image_path: row.get(3)?,
        rating: row.get(4)?,
        wins: row.get(5)?,
        losses: row.get(6)?,
        played: row.get(7)?,
    })
}

pub fn find_by_appid(conn: &Connection, appid: &str) -> Result<Option<Game>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE appid = ?1");

    conn.query_row(&sql, params![appid], parse_game_row)
        .optional()
        .context("Failed to query game by appid")
}

/// All games in import order.
pub fn list_all(conn: &Connection) -> Result<Vec<Game>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY rowid");
    query_games(conn, &sql)
}

/// All games, best rated first.
pub fn list_by_rating(conn: &Connection) -> Result<Vec<Game>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY rating DESC, rowid");
    query_games(conn, &sql)
}

fn query_games(conn: &Connection, sql: &str) -> Result<Vec<Game>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn count_games(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
        .context("Failed to count games")
}

/// Removes the game and its genre memberships. History is kept.
pub fn delete_game(conn: &Connection, appid: &str) -> Result<bool> {
    conn.execute("DELETE FROM genre_games WHERE appid = ?1", params![appid])
        .context("Failed to delete genre memberships")?;
    let removed = conn
        .execute("DELETE FROM games WHERE appid = ?1", params![appid])
        .context("Failed to delete game")?;
    Ok(removed > 0)
}

/// Writes rating and counters of an existing game. Fails if the game is gone,
/// so a concurrent delete is never undone.
pub fn update_progress(conn: &Connection, game: &Game) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE games SET rating = ?1, wins = ?2, losses = ?3, played = ?4 WHERE appid = ?5",
            params![game.rating, game.wins, game.losses, game.played, game.appid],
        )
        .with_context(|| format!("Failed to update game {}", game.appid))?;
    if updated == 0 {
        bail!("Game {} no longer exists", game.appid);
    }
    Ok(())
}

pub fn set_image_path(conn: &Connection, appid: &str, image_path: &str) -> Result<()> {
    conn.execute(
        "UPDATE games SET image_path = ?1 WHERE appid = ?2",
        params![image_path, appid],
    )
    .context("Failed to update image path")
    .map(|_| ())
}

/// Inserts a new game or refreshes the image URL of an existing one.
/// Returns true when the game was new.
pub fn merge_import_entry(conn: &Connection, entry: &ImportEntry, starting_rating: f64) -> Result<bool> {
    if find_by_appid(conn, &entry.appid)?.is_some() {
        if let Some(url) = &entry.image_url {
            conn.execute(
                "UPDATE games SET image_url = ?1 WHERE appid = ?2",
                params![url, entry.appid],
            )
            .context("Failed to refresh image url")?;
        }
        return Ok(false);
    }

    let game = Game {
        image_url: entry.image_url.clone(),
        rating: starting_rating,
        ..Game::new(entry.appid.clone(), entry.title.clone())
    };
    upsert_game(conn, &game)?;
    Ok(true)
}

pub fn reset_all_ratings(conn: &Connection, rating: f64) -> Result<usize> {
    conn.execute(
        "UPDATE games SET rating = ?1, wins = 0, losses = 0, played = 0",
        params![rating],
    )
    .context("Failed to reset ratings")
}
