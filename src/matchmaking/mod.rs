//! Pair selection and match resolution.

pub mod pairing;
pub mod resolver;

use rand::Rng;

use crate::domain::{Game, PreferenceConfig};
use crate::errors::{RankError, RankResult};
use crate::store::{GameStore, GenreFilter, HistoryLog};

pub use pairing::{select_pair, top_slice_len, Pair};
pub use resolver::{MatchOutcome, MatchResolver};

/// Games eligible for pairing, restricted to a genre's members when one is given.
///
/// A missing genre is an error rather than a silent fallback to every game.
pub fn scoped_candidates<S>(store: &S, genre: Option<&str>) -> RankResult<Vec<Game>>
where
    S: GameStore + GenreFilter,
{
    let games = store.list_all()?;
    let Some(genre_id) = genre else {
        return Ok(games);
    };

    let members = store
        .members_of(genre_id)?
        .ok_or_else(|| RankError::GenreNotFound(genre_id.to_string()))?;

    Ok(games
        .into_iter()
        .filter(|game| members.contains(&game.appid))
        .collect())
}

/// Loads candidates and recent history from the store and selects a pair.
pub fn next_pair<S, R>(
    store: &S,
    prefs: &PreferenceConfig,
    challenger: Option<&str>,
    genre: Option<&str>,
    rng: &mut R,
) -> RankResult<Pair>
where
    S: GameStore + GenreFilter + HistoryLog,
    R: Rng + ?Sized,
{
    let candidates = scoped_candidates(store, genre)?;
    if candidates.len() < 2 {
        return Err(RankError::InsufficientCandidates {
            found: candidates.len(),
        });
    }

    // The challenger comes from the whole wishlist; only opponents are genre scoped.
    let challenger = match challenger {
        Some(appid) => Some(
            store
                .get(appid)?
                .ok_or_else(|| RankError::UnknownGame(appid.to_string()))?,
        ),
        None => None,
    };

    let recent = if prefs.prefer_new_choices {
        store.recent(prefs.recent_window)?
    } else {
        Vec::new()
    };

    select_pair(&candidates, prefs, challenger.as_ref(), &recent, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::genres;
    use crate::store::SqliteStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store_with_games(count: usize) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for i in 0..count {
            store.upsert(&Game::new(i.to_string(), format!("Game {i}"))).unwrap();
        }
        store
    }

    #[test]
    fn test_single_member_genre_is_insufficient() {
        let store = store_with_games(200);
        {
            let conn = store.connection().unwrap();
            genres::insert_genre(&conn, "solo", "Solo").unwrap();
            genres::add_member(&conn, "solo", "42").unwrap();
        }
        let mut rng = StdRng::seed_from_u64(1);

        let err = next_pair(&store, &PreferenceConfig::default(), None, Some("solo"), &mut rng).unwrap_err();
        assert!(matches!(err, RankError::InsufficientCandidates { found: 1 }));
    }

    #[test]
    fn test_missing_genre_does_not_fall_back() {
        let store = store_with_games(10);
        let mut rng = StdRng::seed_from_u64(1);

        let err = next_pair(&store, &PreferenceConfig::default(), None, Some("nope"), &mut rng).unwrap_err();
        assert!(matches!(err, RankError::GenreNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_genre_scope_limits_pairs() {
        let store = store_with_games(30);
        {
            let conn = store.connection().unwrap();
            genres::insert_genre(&conn, "rpg", "RPG").unwrap();
            for appid in ["3", "7", "11"] {
                genres::add_member(&conn, "rpg", appid).unwrap();
            }
        }
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..100 {
            let pair = next_pair(&store, &PreferenceConfig::default(), None, Some("rpg"), &mut rng).unwrap();
            for game in [&pair.a, &pair.b] {
                assert!(["3", "7", "11"].contains(&game.appid.as_str()));
            }
        }
    }

    #[test]
    fn test_challenger_outside_genre_meets_genre_opponents() {
        let store = store_with_games(5);
        {
            let conn = store.connection().unwrap();
            genres::insert_genre(&conn, "pair", "Pair").unwrap();
            genres::add_member(&conn, "pair", "0").unwrap();
            genres::add_member(&conn, "pair", "1").unwrap();
        }
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..20 {
            let pair = next_pair(&store, &PreferenceConfig::default(), Some("4"), Some("pair"), &mut rng).unwrap();
            assert_eq!(pair.a.appid, "4");
            assert!(["0", "1"].contains(&pair.b.appid.as_str()));
        }

        let err = next_pair(&store, &PreferenceConfig::default(), Some("nope"), Some("pair"), &mut rng).unwrap_err();
        assert!(matches!(err, RankError::UnknownGame(id) if id == "nope"));
    }
}
