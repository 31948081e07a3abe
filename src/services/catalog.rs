use std::collections::{BTreeMap, HashMap};

use log::info;
use serde::Serialize;

use crate::config::RatingSettings;
use crate::database::{self, TOTAL_PLAYED};
use crate::domain::{Game, Genre, HistoryEntry, ImportBatch, UserSettings};
use crate::errors::{RankError, RankResult};
use crate::store::{MatchRecorder, SqliteStore};

const SEARCH_LIMIT: usize = 50;

/// `imported` counts every item received, skipped ones included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub added: usize,
    pub total: i64,
}

/// A game with its win rate, as shown on leaderboards.
#[derive(Debug, Clone, Serialize)]
pub struct RankedGame {
    #[serde(flatten)]
    pub game: Game,
    pub winrate_percent: f64,
}

impl From<Game> for RankedGame {
    fn from(game: Game) -> Self {
        let winrate_percent = game.win_rate_percent();
        Self { game, winrate_percent }
    }
}

/// Filtered leaderboard; `count` is the number of matches before the limit.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub count: usize,
    pub games: Vec<RankedGame>,
}

/// A history entry decorated with the current titles and images.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub winner_title: String,
    pub winner_image: String,
    pub loser_title: String,
    pub loser_image: String,
}

/// Wishlist and genre management around the ranking core.
pub struct CatalogService {
    store: SqliteStore,
    rating: RatingSettings,
}

impl CatalogService {
    pub fn new(store: SqliteStore, rating: RatingSettings) -> Self {
        Self { store, rating }
    }

    pub fn import(&self, batch: &ImportBatch) -> RankResult<ImportSummary> {
        let _guard = self.store.lock_writes();
        let mut conn = self.store.connection()?;
        let tx = conn.transaction().map_err(anyhow::Error::from)?;
        let mut added = 0;
        for entry in &batch.entries {
            if database::games::merge_import_entry(&tx, entry, self.rating.starting_rating)? {
                added += 1;
            }
        }
        tx.commit().map_err(anyhow::Error::from)?;

        let total = database::games::count_games(&conn)?;
        info!(
            "Imported {} of {} entries ({} new), wishlist now has {} games",
            batch.entries.len(),
            batch.received,
            added,
            total
        );
        Ok(ImportSummary {
            imported: batch.received,
            added,
            total,
        })
    }

    pub fn game(&self, appid: &str) -> RankResult<Game> {
        let conn = self.store.connection()?;
        database::games::find_by_appid(&conn, appid)?
            .ok_or_else(|| RankError::UnknownGame(appid.to_string()))
    }

    pub fn delete_game(&self, appid: &str) -> RankResult<()> {
        let _guard = self.store.lock_writes();
        let conn = self.store.connection()?;
        if !database::games::delete_game(&conn, appid)? {
            return Err(RankError::UnknownGame(appid.to_string()));
        }
        info!("Deleted game {}", appid);
        Ok(())
    }

    pub fn all_games(&self) -> RankResult<Vec<Game>> {
        let conn = self.store.connection()?;
        Ok(database::games::list_all(&conn)?)
    }

    pub fn count_games(&self) -> RankResult<i64> {
        let conn = self.store.connection()?;
        Ok(database::games::count_games(&conn)?)
    }

    pub fn total_played(&self) -> RankResult<i64> {
        let conn = self.store.connection()?;
        Ok(database::stats::get(&conn, TOTAL_PLAYED)?)
    }

    /// All counters, with `total_played` present even before the first match.
    pub fn stats(&self) -> RankResult<BTreeMap<String, i64>> {
        let conn = self.store.connection()?;
        let mut stats = database::stats::list_all(&conn)?;
        stats.entry(TOTAL_PLAYED.to_string()).or_insert(0);
        Ok(stats)
    }

    /// Best rated first, optionally filtered by title.
    pub fn leaderboard(&self, query: Option<&str>, limit: usize) -> RankResult<Leaderboard> {
        let conn = self.store.connection()?;
        let games = database::games::list_by_rating(&conn)?;
        Ok(rank(games, query, limit))
    }

    pub fn genre_leaderboard(&self, genre_id: &str, query: Option<&str>, limit: usize) -> RankResult<Leaderboard> {
        let genre = self.genre(genre_id)?;
        let conn = self.store.connection()?;
        let games = database::games::list_by_rating(&conn)?
            .into_iter()
            .filter(|game| genre.games.contains(&game.appid))
            .collect();
        Ok(rank(games, query, limit))
    }

    pub fn search(&self, query: &str) -> RankResult<Vec<Game>> {
        let conn = self.store.connection()?;
        let games = database::games::list_all(&conn)?;
        Ok(games
            .into_iter()
            .filter(|game| game.matches_title(query))
            .take(SEARCH_LIMIT)
            .collect())
    }

    pub fn game_history(&self, appid: &str) -> RankResult<Vec<HistoryEntry>> {
        let conn = self.store.connection()?;
        Ok(database::history::list_for_game(&conn, appid)?)
    }

    /// Whole history, most recent first. Deleted games fall back to their appid.
    pub fn history(&self) -> RankResult<Vec<HistoryView>> {
        let conn = self.store.connection()?;
        let entries = database::history::list_all(&conn)?;
        let games: HashMap<String, Game> = database::games::list_all(&conn)?
            .into_iter()
            .map(|game| (game.appid.clone(), game))
            .collect();

        let describe = |appid: &str| match games.get(appid) {
            Some(game) => (game.title.clone(), game.display_image().unwrap_or_default().to_string()),
            None => (appid.to_string(), String::new()),
        };

        Ok(entries
            .into_iter()
            .rev()
            .map(|entry| {
                let (winner_title, winner_image) = describe(&entry.winner);
                let (loser_title, loser_image) = describe(&entry.loser);
                HistoryView {
                    entry,
                    winner_title,
                    winner_image,
                    loser_title,
                    loser_image,
                }
            })
            .collect())
    }

    pub fn settings(&self) -> RankResult<UserSettings> {
        let conn = self.store.connection()?;
        Ok(database::settings::load_settings(&conn)?)
    }

    pub fn save_settings(&self, settings: &UserSettings) -> RankResult<()> {
        let _guard = self.store.lock_writes();
        let conn = self.store.connection()?;
        Ok(database::settings::save_settings(&conn, settings)?)
    }

    pub fn genres(&self) -> RankResult<Vec<Genre>> {
        let conn = self.store.connection()?;
        Ok(database::genres::list_genres(&conn)?)
    }

    pub fn genre(&self, genre_id: &str) -> RankResult<Genre> {
        let conn = self.store.connection()?;
        database::genres::find_genre(&conn, genre_id)?
            .ok_or_else(|| RankError::GenreNotFound(genre_id.to_string()))
    }

    pub fn create_genre(&self, name: &str) -> RankResult<Genre> {
        let id = Genre::id_for_name(name);
        let _guard = self.store.lock_writes();
        let conn = self.store.connection()?;
        if database::genres::find_genre(&conn, &id)?.is_some() {
            return Err(RankError::GenreExists(id));
        }
        let genre = database::genres::insert_genre(&conn, &id, name)?;
        info!("Created genre {}", id);
        Ok(genre)
    }

    pub fn delete_genre(&self, genre_id: &str) -> RankResult<()> {
        let _guard = self.store.lock_writes();
        let conn = self.store.connection()?;
        if !database::genres::delete_genre(&conn, genre_id)? {
            return Err(RankError::GenreNotFound(genre_id.to_string()));
        }
        info!("Deleted genre {}", genre_id);
        Ok(())
    }

    pub fn add_to_genre(&self, genre_id: &str, appid: &str) -> RankResult<()> {
        let _guard = self.store.lock_writes();
        self.genre(genre_id)?;
        self.game(appid)?;
        let conn = self.store.connection()?;
        database::genres::add_member(&conn, genre_id, appid)?;
        Ok(())
    }

    pub fn remove_from_genre(&self, genre_id: &str, appid: &str) -> RankResult<()> {
        let _guard = self.store.lock_writes();
        self.genre(genre_id)?;
        let conn = self.store.connection()?;
        if !database::genres::remove_member(&conn, genre_id, appid)? {
            return Err(RankError::NotInGenre {
                genre_id: genre_id.to_string(),
                appid: appid.to_string(),
            });
        }
        Ok(())
    }
}

fn rank(games: Vec<Game>, query: Option<&str>, limit: usize) -> Leaderboard {
    let matching: Vec<Game> = games
        .into_iter()
        .filter(|game| query.is_none_or(|q| game.matches_title(q)))
        .collect();

    Leaderboard {
        count: matching.len(),
        games: matching.into_iter().take(limit).map(RankedGame::from).collect(),
    }
}
