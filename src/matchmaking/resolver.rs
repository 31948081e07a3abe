use std::sync::Arc;

use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::domain::{Game, HistoryEntry};
use crate::errors::{RankError, RankResult};
use crate::rating::update_elo;
use crate::store::{GameStore, MatchRecorder};

/// Result of a resolved vote or pass.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub winner: Game,
    pub loser: Game,
    pub entry: HistoryEntry,
    pub total_played: i64,
}

/// Applies match results to the store.
///
/// Every resolution holds the store's write lock from lookup to commit, so
/// concurrent calls never lose rating updates and history order equals
/// completion order. The writes themselves land in one transaction.
pub struct MatchResolver<S> {
    store: Arc<S>,
}

impl<S> MatchResolver<S>
where
    S: GameStore + MatchRecorder,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Records an explicit choice of `winner_id` over `loser_id`.
    pub fn resolve_vote(&self, winner_id: &str, loser_id: &str, k: f64) -> RankResult<MatchOutcome> {
        check_request(winner_id, loser_id, k)?;
        let _guard = self.store.lock_writes();
        let winner = self.require_game(winner_id)?;
        let loser = self.require_game(loser_id)?;
        self.apply(winner, loser, k, false)
    }

    /// Auto-resolves a skipped comparison in favour of the lower rated game.
    /// Equal ratings favour `a_id`.
    pub fn resolve_pass(&self, a_id: &str, b_id: &str, k: f64) -> RankResult<MatchOutcome> {
        check_request(a_id, b_id, k)?;
        let _guard = self.store.lock_writes();
        let a = self.require_game(a_id)?;
        let b = self.require_game(b_id)?;
        let (winner, loser) = if a.rating <= b.rating { (a, b) } else { (b, a) };
        self.apply(winner, loser, k, true)
    }

    fn require_game(&self, appid: &str) -> RankResult<Game> {
        self.store
            .get(appid)?
            .ok_or_else(|| RankError::UnknownGame(appid.to_string()))
    }

    fn apply(&self, mut winner: Game, mut loser: Game, k: f64, is_pass: bool) -> RankResult<MatchOutcome> {
        let r_w_before = winner.rating;
        let r_l_before = loser.rating;
        let update = update_elo(r_w_before, r_l_before, k);

        winner.record_win(update.winner);
        loser.record_loss(update.loser);

        let entry = HistoryEntry {
            winner: winner.appid.clone(),
            loser: loser.appid.clone(),
            r_w_before,
            r_l_before,
            r_w_after: update.winner,
            r_l_after: update.loser,
            k,
            is_pass,
            recorded_at: Utc::now().naive_utc(),
        };
        let total_played = self.store.record_match(&winner, &loser, &entry)?;

        info!(
            "{} {} ({:.1} -> {:.1}) over {} ({:.1} -> {:.1}), k={}",
            if is_pass { "Pass:" } else { "Vote:" },
            winner.appid,
            r_w_before,
            update.winner,
            loser.appid,
            r_l_before,
            update.loser,
            k
        );

        Ok(MatchOutcome {
            winner,
            loser,
            entry,
            total_played,
        })
    }
}

fn check_request(first: &str, second: &str, k: f64) -> RankResult<()> {
    if first == second {
        return Err(RankError::SameGame(first.to_string()));
    }
    if !k.is_finite() || k <= 0.0 {
        return Err(RankError::InvalidKFactor(k));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TOTAL_PLAYED;
    use crate::store::{HistoryLog, SqliteStore};
    use std::thread;

    fn resolver_with(games: &[(&str, f64)]) -> MatchResolver<SqliteStore> {
        let store = SqliteStore::open_in_memory().unwrap();
        for (appid, rating) in games {
            let mut game = Game::new(*appid, format!("Game {appid}"));
            game.rating = *rating;
            store.upsert(&game).unwrap();
        }
        MatchResolver::new(Arc::new(store))
    }

    #[test]
    fn test_vote_updates_ratings_counters_and_history() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);

        let outcome = resolver.resolve_vote("a", "b", 24.0).unwrap();

        assert!((outcome.winner.rating - 1512.0).abs() < 1e-9);
        assert!((outcome.loser.rating - 1488.0).abs() < 1e-9);
        assert_eq!(outcome.total_played, 1);
        assert!(!outcome.entry.is_pass);

        let store = resolver.store();
        let a = store.get("a").unwrap().unwrap();
        let b = store.get("b").unwrap().unwrap();
        assert_eq!((a.wins, a.losses, a.played), (1, 0, 1));
        assert_eq!((b.wins, b.losses, b.played), (0, 1, 1));
        assert_eq!(store.all().unwrap(), vec![outcome.entry]);
    }

    #[test]
    fn test_vote_with_unknown_game_changes_nothing() {
        let resolver = resolver_with(&[("a", 1500.0)]);

        let err = resolver.resolve_vote("a", "ghost", 48.0).unwrap_err();
        assert!(matches!(err, RankError::UnknownGame(id) if id == "ghost"));

        let err = resolver.resolve_pass("ghost", "a", 24.0).unwrap_err();
        assert!(matches!(err, RankError::UnknownGame(_)));

        assert_eq!(resolver.store().get("a").unwrap().unwrap().played, 0);
        assert!(resolver.store().all().unwrap().is_empty());
    }

    #[test]
    fn test_game_cannot_play_itself() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);

        let err = resolver.resolve_vote("a", "a", 48.0).unwrap_err();
        assert!(matches!(err, RankError::SameGame(id) if id == "a"));
        assert!(matches!(resolver.resolve_pass("b", "b", 24.0), Err(RankError::SameGame(_))));

        let a = resolver.store().get("a").unwrap().unwrap();
        assert_eq!((a.rating, a.played), (1500.0, 0));
        assert!(resolver.store().all().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unusable_k_factor() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);

        for k in [0.0, -24.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(resolver.resolve_vote("a", "b", k), Err(RankError::InvalidKFactor(_))));
            assert!(matches!(resolver.resolve_pass("a", "b", k), Err(RankError::InvalidKFactor(_))));
        }
        assert!(resolver.store().all().unwrap().is_empty());
    }

    #[test]
    fn test_failed_history_write_rolls_back_ratings() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);
        {
            let conn = resolver.store().connection().unwrap();
            conn.execute_batch(
                "CREATE TRIGGER reject_history BEFORE INSERT ON history
                 BEGIN SELECT RAISE(ABORT, 'history is read only'); END;",
            )
            .unwrap();
        }

        let err = resolver.resolve_vote("a", "b", 48.0).unwrap_err();
        assert!(matches!(err, RankError::Storage(_)));

        let store = resolver.store();
        for appid in ["a", "b"] {
            let game = store.get(appid).unwrap().unwrap();
            assert_eq!((game.rating, game.played), (1500.0, 0), "{appid}");
        }
        assert!(store.all().unwrap().is_empty());
        let conn = store.connection().unwrap();
        assert_eq!(crate::database::stats::get(&conn, TOTAL_PLAYED).unwrap(), 0);
    }

    #[test]
    fn test_pass_favours_lower_rating() {
        let resolver = resolver_with(&[("high", 1600.0), ("low", 1400.0)]);

        let outcome = resolver.resolve_pass("high", "low", 24.0).unwrap();

        assert_eq!(outcome.winner.appid, "low");
        assert!(outcome.entry.is_pass);
        assert!(outcome.entry.r_w_before <= outcome.entry.r_l_before);
    }

    #[test]
    fn test_pass_tie_goes_to_first_argument() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);
        assert_eq!(resolver.resolve_pass("b", "a", 24.0).unwrap().winner.appid, "b");
        // b is now ahead, so the next pass favours a.
        assert_eq!(resolver.resolve_pass("b", "a", 24.0).unwrap().winner.appid, "a");
    }

    #[test]
    fn test_replays_are_not_deduplicated() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1500.0)]);
        let first = resolver.resolve_vote("a", "b", 48.0).unwrap();
        let second = resolver.resolve_vote("a", "b", 48.0).unwrap();

        assert!(second.winner.rating > first.winner.rating);
        assert_eq!(second.total_played, 2);
        assert_eq!(resolver.store().all().unwrap().len(), 2);
    }

    #[test]
    fn test_played_equals_wins_plus_losses() {
        let resolver = resolver_with(&[("a", 1500.0), ("b", 1550.0), ("c", 1450.0)]);
        let script = [("a", "b"), ("c", "a"), ("b", "c"), ("a", "c"), ("b", "a")];
        for (i, (x, y)) in script.iter().enumerate() {
            if i % 2 == 0 {
                resolver.resolve_vote(x, y, 48.0).unwrap();
            } else {
                resolver.resolve_pass(x, y, 24.0).unwrap();
            }
        }

        for game in resolver.store().list_all().unwrap() {
            assert_eq!(game.played, game.wins + game.losses, "{}", game.appid);
        }
    }

    #[test]
    fn test_concurrent_votes_keep_every_update() {
        let resolver = Arc::new(resolver_with(&[("a", 1500.0), ("b", 1500.0)]));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    for _ in 0..5 {
                        if i % 2 == 0 {
                            resolver.resolve_vote("a", "b", 48.0).unwrap();
                        } else {
                            resolver.resolve_vote("b", "a", 48.0).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = resolver.store();
        let a = store.get("a").unwrap().unwrap();
        let b = store.get("b").unwrap().unwrap();
        assert_eq!(a.played, 40);
        assert_eq!(b.played, 40);
        assert_eq!(a.wins + b.wins, 40);

        // Each entry starts from the ratings the previous one ended with.
        let history = store.all().unwrap();
        assert_eq!(history.len(), 40);
        for window in history.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            let prev_a = if prev.winner == "a" { prev.r_w_after } else { prev.r_l_after };
            let next_a = if next.winner == "a" { next.r_w_before } else { next.r_l_before };
            assert!((prev_a - next_a).abs() < 1e-9);
        }
    }
}
