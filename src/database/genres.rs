use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::Genre;

pub fn insert_genre(conn: &Connection, id: &str, name: &str) -> Result<Genre> {
    conn.execute(
        "INSERT INTO genres (id, name) VALUES (?1, ?2)",
        params![id, name],
    )
    .context("Failed to insert genre")?;

    Ok(Genre {
        id: id.to_string(),
        name: name.to_string(),
        games: Vec::new(),
    })
}

pub fn find_genre(conn: &Connection, id: &str) -> Result<Option<Genre>> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM genres WHERE id = ?1", params![id], |row| row.get(0))
        .optional()
        .context("Failed to query genre")?;

    match name {
        Some(name) => Ok(Some(Genre {
            id: id.to_string(),
            name,
            games: list_members(conn, id)?,
        })),
        None => Ok(None),
    }
}

pub fn list_genres(conn: &Connection) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY rowid")?;
    let headers = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    headers
        .into_iter()
        .map(|(id, name)| {
            let games = list_members(conn, &id)?;
            Ok(Genre { id, name, games })
        })
        .collect()
}

/// Member appids in the order they were added.
pub fn list_members(conn: &Connection, genre_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT appid FROM genre_games WHERE genre_id = ?1 ORDER BY rowid")?;
    let rows = stmt
        .query_map(params![genre_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn delete_genre(conn: &Connection, id: &str) -> Result<bool> {
    conn.execute("DELETE FROM genre_games WHERE genre_id = ?1", params![id])
        .context("Failed to delete genre members")?;
    let removed = conn
        .execute("DELETE FROM genres WHERE id = ?1", params![id])
        .context("Failed to delete genre")?;
    Ok(removed > 0)
}

/// Returns false when the game was already a member.
pub fn add_member(conn: &Connection, genre_id: &str, appid: &str) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO genre_games (genre_id, appid) VALUES (?1, ?2)",
            params![genre_id, appid],
        )
        .context("Failed to add game to genre")?;
    Ok(inserted > 0)
}

pub fn remove_member(conn: &Connection, genre_id: &str, appid: &str) -> Result<bool> {
    let removed = conn
        .execute(
            "DELETE FROM genre_games WHERE genre_id = ?1 AND appid = ?2",
            params![genre_id, appid],
        )
        .context("Failed to remove game from genre")?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup};

    #[test]
    fn test_genre_membership() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        setup::ensure_schema(&mut conn).unwrap();

        insert_genre(&conn, "rpg", "RPG").unwrap();
        assert!(insert_genre(&conn, "rpg", "RPG").is_err());

        assert!(add_member(&conn, "rpg", "20").unwrap());
        assert!(add_member(&conn, "rpg", "10").unwrap());
        assert!(!add_member(&conn, "rpg", "20").unwrap());

        let genre = find_genre(&conn, "rpg").unwrap().unwrap();
        assert_eq!(genre.games, vec!["20", "10"]);

        assert!(remove_member(&conn, "rpg", "20").unwrap());
        assert!(!remove_member(&conn, "rpg", "20").unwrap());
        assert_eq!(list_genres(&conn).unwrap()[0].games, vec!["10"]);

        assert!(delete_genre(&conn, "rpg").unwrap());
        assert!(find_genre(&conn, "rpg").unwrap().is_none());
        assert!(list_members(&conn, "rpg").unwrap().is_empty());
    }
}
