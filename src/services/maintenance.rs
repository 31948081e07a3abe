use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::config::{RatingSettings, StorageSettings};
use crate::database::{self, TOTAL_PLAYED};
use crate::errors::{RankError, RankResult};
use crate::store::{MatchRecorder, SqliteStore};

const SNAPSHOT_EXTENSION: &str = "db";

/// Snapshots, restores and the "reset everything" operation.
pub struct MaintenanceService {
    store: SqliteStore,
    rating: RatingSettings,
    snapshot_dir: PathBuf,
}

impl MaintenanceService {
    pub fn new(store: SqliteStore, rating: RatingSettings, storage: &StorageSettings) -> Self {
        Self {
            store,
            rating,
            snapshot_dir: storage.snapshot_dir.clone(),
        }
    }

    /// Copies the database into the next numbered snapshot and returns its version.
    pub fn save_snapshot(&self) -> RankResult<u32> {
        fs::create_dir_all(&self.snapshot_dir).context("Failed to create snapshot directory")?;
        let version = self.list_snapshots()?.last().map_or(1, |v| v + 1);
        let target = self.snapshot_path(version);

        let conn = self.store.connection()?;
        database::snapshots::write_snapshot(&conn, &target)?;
        info!("Saved snapshot {} to {}", version, target.display());
        Ok(version)
    }

    /// Snapshot versions, oldest first.
    pub fn list_snapshots(&self) -> RankResult<Vec<u32>> {
        if !self.snapshot_dir.exists() {
            return Ok(Vec::new());
        }
        let mut versions: Vec<u32> = fs::read_dir(&self.snapshot_dir)
            .context("Failed to read snapshot directory")?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_version(&entry.path()))
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }

    pub fn restore(&self, version: u32) -> RankResult<()> {
        let source = self.snapshot_path(version);
        if !source.exists() {
            return Err(RankError::SnapshotNotFound(version));
        }
        let _guard = self.store.lock_writes();
        let mut conn = self.store.connection()?;
        database::snapshots::restore_snapshot(&mut conn, &source)?;
        info!("Restored snapshot {}", version);
        Ok(())
    }

    /// Snapshots first, then puts every game back to the starting rating and
    /// clears history and the match counter. Returns the snapshot version.
    pub fn reset_ratings(&self) -> RankResult<u32> {
        let _guard = self.store.lock_writes();
        let version = self.save_snapshot()?;

        let mut conn = self.store.connection()?;
        let tx = conn.transaction().context("Failed to start reset")?;
        let games = database::games::reset_all_ratings(&tx, self.rating.starting_rating)?;
        database::history::clear(&tx)?;
        database::stats::set(&tx, TOTAL_PLAYED, 0)?;
        tx.commit().context("Failed to commit reset")?;

        info!("Reset {} games; backup saved as snapshot {}", games, version);
        Ok(version)
    }

    fn snapshot_path(&self, version: u32) -> PathBuf {
        self.snapshot_dir.join(format!("{}.{}", version, SNAPSHOT_EXTENSION))
    }
}

fn parse_version(path: &Path) -> Option<u32> {
    if path.extension()? != SNAPSHOT_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
