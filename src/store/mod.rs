//! Narrow persistence interface the ranking core works against.

pub mod sqlite;

use std::collections::HashSet;
use std::sync::MutexGuard;

use anyhow::Result;

use crate::domain::{AppId, Game, HistoryEntry};

pub use sqlite::SqliteStore;

/// Keyed collection of games.
pub trait GameStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<Game>>;
    fn get(&self, appid: &str) -> Result<Option<Game>>;
    fn upsert(&self, game: &Game) -> Result<()>;
    fn remove(&self, appid: &str) -> Result<bool>;
}

/// Append-only log of resolved matches.
pub trait HistoryLog: Send + Sync {
    fn append_entry(&self, entry: &HistoryEntry) -> Result<()>;
    /// The last `n` entries, oldest first.
    fn recent(&self, n: usize) -> Result<Vec<HistoryEntry>>;
    fn all(&self) -> Result<Vec<HistoryEntry>>;
}

pub trait GenreFilter: Send + Sync {
    /// `None` when the genre does not exist.
    fn members_of(&self, genre_id: &str) -> Result<Option<HashSet<AppId>>>;
}

pub trait StatsCounter: Send + Sync {
    /// Returns the counter value after the increment.
    fn increment(&self, name: &str) -> Result<i64>;
}

/// Atomic write path for resolved matches, plus the lock every writer of the
/// store shares.
pub trait MatchRecorder: Send + Sync {
    /// Serializes writers. Hold it across a whole read-modify-write.
    fn lock_writes(&self) -> MutexGuard<'_, ()>;

    /// Stores both games, appends `entry` and bumps `total_played` as one unit.
    /// Fails without writing anything if either game no longer exists.
    /// Returns the new match count.
    fn record_match(&self, winner: &Game, loser: &Game, entry: &HistoryEntry) -> Result<i64>;
}
