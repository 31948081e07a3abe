use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};

use super::{GameStore, GenreFilter, HistoryLog, MatchRecorder, StatsCounter};
use crate::database::{self, setup, DbConn, DbPool, TOTAL_PLAYED};
use crate::domain::{AppId, Game, HistoryEntry};

/// SQLite-backed implementation of every store trait.
///
/// Clones share the pool and the write lock.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    writes: Arc<Mutex<()>>,
}

impl SqliteStore {
    /// Wraps a pool, creating missing tables first.
    pub fn open(pool: DbPool) -> Result<Self> {
        let mut conn = database::get_connection(&pool)?;
        setup::ensure_schema(&mut conn)?;
        drop(conn);
        Ok(Self {
            pool,
            writes: Arc::new(Mutex::new(())),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(database::create_memory_pool()?)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn connection(&self) -> Result<DbConn> {
        database::get_connection(&self.pool)
    }
}

impl GameStore for SqliteStore {
    fn list_all(&self) -> Result<Vec<Game>> {
        let conn = self.connection()?;
        database::games::list_all(&conn)
    }

    fn get(&self, appid: &str) -> Result<Option<Game>> {
        let conn = self.connection()?;
        database::games::find_by_appid(&conn, appid)
    }

    fn upsert(&self, game: &Game) -> Result<()> {
        let conn = self.connection()?;
        database::games::upsert_game(&conn, game)
    }

    fn remove(&self, appid: &str) -> Result<bool> {
        let conn = self.connection()?;
        database::games::delete_game(&conn, appid)
    }
}

impl HistoryLog for SqliteStore {
    fn append_entry(&self, entry: &HistoryEntry) -> Result<()> {
        let conn = self.connection()?;
        database::history::append_entry(&conn, entry)
    }

    fn recent(&self, n: usize) -> Result<Vec<HistoryEntry>> {
        let conn = self.connection()?;
        database::history::list_recent(&conn, n)
    }

    fn all(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.connection()?;
        database::history::list_all(&conn)
    }
}

impl GenreFilter for SqliteStore {
    fn members_of(&self, genre_id: &str) -> Result<Option<HashSet<AppId>>> {
        let conn = self.connection()?;
        let genre = database::genres::find_genre(&conn, genre_id)?;
        Ok(genre.map(|g| g.games.into_iter().collect()))
    }
}

impl StatsCounter for SqliteStore {
    fn increment(&self, name: &str) -> Result<i64> {
        let conn = self.connection()?;
        database::stats::increment(&conn, name)
    }
}

impl MatchRecorder for SqliteStore {
    /// The guarded value is unit, so a poisoned lock carries no broken state.
    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_match(&self, winner: &Game, loser: &Game, entry: &HistoryEntry) -> Result<i64> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().context("Failed to start match transaction")?;
        database::games::update_progress(&tx, winner)?;
        database::games::update_progress(&tx, loser)?;
        database::history::append_entry(&tx, entry)?;
        let total_played = database::stats::increment(&tx, TOTAL_PLAYED)?;
        tx.commit().context("Failed to commit match")?;
        Ok(total_played)
    }
}
