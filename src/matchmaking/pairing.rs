use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::{Game, HistoryEntry, PreferenceConfig};
use crate::errors::{RankError, RankResult};

/// Share of the ranked list that a pick is drawn from.
const TOP_SLICE_FRACTION: f64 = 0.1;
const MIN_TOP_SLICE: usize = 2;

/// Two distinct games offered for comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub a: Game,
    pub b: Game,
}

impl Pair {
    pub fn contains(&self, appid: &str) -> bool {
        self.a.appid == appid || self.b.appid == appid
    }
}

/// Number of leading candidates a pick is sampled from.
pub fn top_slice_len(ranked_len: usize) -> usize {
    let fraction = (ranked_len as f64 * TOP_SLICE_FRACTION).floor() as usize;
    fraction.max(MIN_TOP_SLICE)
}

/// Chooses two distinct games from `candidates`.
///
/// With a `challenger` that game is always side `a` and only the opponent is
/// sampled from `candidates`; the challenger itself need not be one of them. `recent` may be the full history; only its last
/// `prefs.recent_window` entries count as recently seen.
pub fn select_pair<R: Rng + ?Sized>(
    candidates: &[Game],
    prefs: &PreferenceConfig,
    challenger: Option<&Game>,
    recent: &[HistoryEntry],
    rng: &mut R,
) -> RankResult<Pair> {
    if candidates.len() < 2 {
        return Err(RankError::InsufficientCandidates {
            found: candidates.len(),
        });
    }

    let seen = recently_seen(recent, prefs);

    let picked = match challenger {
        Some(first) => {
            let opponents: Vec<&Game> = candidates.iter().filter(|g| g.appid != first.appid).collect();
            if opponents.is_empty() {
                return Err(RankError::InsufficientCandidates { found: 1 });
            }
            let ranked = rank_candidates(opponents, prefs, &seen, Some(first));
            pick_from_top(&ranked, rng).map(|second| (first, second))
        }
        None => {
            let ranked = rank_candidates(candidates.iter().collect(), prefs, &seen, None);
            pick_from_top(&ranked, rng).and_then(|first| {
                let rest: Vec<&Game> = candidates.iter().filter(|g| g.appid != first.appid).collect();
                let ranked = rank_candidates(rest, prefs, &seen, Some(first));
                pick_from_top(&ranked, rng).map(|second| (first, second))
            })
        }
    };

    let (a, b) = match picked {
        Some(pair) => pair,
        None => uniform_pair(candidates, rng)?,
    };

    debug!("Paired {} ({:.1}) with {} ({:.1})", a.appid, a.rating, b.appid, b.rating);
    Ok(Pair {
        a: a.clone(),
        b: b.clone(),
    })
}

fn recently_seen<'a>(recent: &'a [HistoryEntry], prefs: &PreferenceConfig) -> HashSet<&'a str> {
    if !prefs.prefer_new_choices {
        return HashSet::new();
    }
    recent
        .iter()
        .rev()
        .take(prefs.recent_window)
        .flat_map(|entry| [entry.winner.as_str(), entry.loser.as_str()])
        .collect()
}

/// Stable sort by the composite preference key; ties keep candidate order.
fn rank_candidates<'a>(
    games: Vec<&'a Game>,
    prefs: &PreferenceConfig,
    seen: &HashSet<&str>,
    reference: Option<&Game>,
) -> Vec<&'a Game> {
    let mut keyed: Vec<(Vec<f64>, &Game)> = games
        .into_iter()
        .map(|game| (sort_key(game, prefs, seen, reference), game))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| compare_keys(left, right));
    keyed.into_iter().map(|(_, game)| game).collect()
}

/// Key components, most significant first.
fn sort_key(game: &Game, prefs: &PreferenceConfig, seen: &HashSet<&str>, reference: Option<&Game>) -> Vec<f64> {
    let mut key = Vec::with_capacity(3);

    if prefs.prefer_new_choices {
        key.push(if seen.contains(game.appid.as_str()) { 1.0 } else { 0.0 });
    }
    if prefs.prefer_lower_played {
        key.push(f64::from(game.played));
    }
    if let Some(reference) = reference {
        let distance = (game.rating - reference.rating).abs();
        // Close wins when both are set.
        if prefs.prefer_close_rating {
            key.push(distance);
        } else if prefs.prefer_far_rating {
            key.push(-distance);
        }
    }

    key
}

fn compare_keys(left: &[f64], right: &[f64]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(l, r)| l.total_cmp(r))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn pick_from_top<'a, R: Rng + ?Sized>(ranked: &[&'a Game], rng: &mut R) -> Option<&'a Game> {
    let slice = top_slice_len(ranked.len()).min(ranked.len());
    ranked[..slice].choose(rng).copied()
}

fn uniform_pair<'a, R: Rng + ?Sized>(candidates: &'a [Game], rng: &mut R) -> RankResult<(&'a Game, &'a Game)> {
    let mut picked = candidates.choose_multiple(rng, 2);
    match (picked.next(), picked.next()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(RankError::InsufficientCandidates {
            found: candidates.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn games(count: usize) -> Vec<Game> {
        (0..count)
            .map(|i| {
                let mut game = Game::new(i.to_string(), format!("Game {i}"));
                game.rating = 1400.0 + 10.0 * i as f64;
                game.played = (count - i) as u32 * 3;
                game.wins = game.played;
                game
            })
            .collect()
    }

    fn entry(winner: &str, loser: &str) -> HistoryEntry {
        HistoryEntry {
            winner: winner.to_string(),
            loser: loser.to_string(),
            r_w_before: 1500.0,
            r_l_before: 1500.0,
            r_w_after: 1524.0,
            r_l_after: 1476.0,
            k: 48.0,
            is_pass: false,
            recorded_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_top_slice_len() {
        assert_eq!(top_slice_len(2), 2);
        assert_eq!(top_slice_len(19), 2);
        assert_eq!(top_slice_len(20), 2);
        assert_eq!(top_slice_len(35), 3);
        assert_eq!(top_slice_len(400), 40);
    }

    #[test]
    fn test_rejects_fewer_than_two_candidates() {
        let mut rng = StdRng::seed_from_u64(1);
        let prefs = PreferenceConfig::default();

        for count in [0, 1] {
            let err = select_pair(&games(count), &prefs, None, &[], &mut rng).unwrap_err();
            assert!(matches!(err, RankError::InsufficientCandidates { found } if found == count));
        }
    }

    #[test]
    fn test_pair_members_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = games(5);
        let prefs = PreferenceConfig {
            prefer_close_rating: true,
            prefer_lower_played: true,
            ..PreferenceConfig::default()
        };

        for _ in 0..500 {
            let pair = select_pair(&pool, &prefs, None, &[], &mut rng).unwrap();
            assert_ne!(pair.a.appid, pair.b.appid);
        }
    }

    #[test]
    fn test_two_candidates_always_pair_each_other() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = games(2);
        for _ in 0..50 {
            let pair = select_pair(&pool, &PreferenceConfig::default(), None, &[], &mut rng).unwrap();
            assert!(pair.contains("0") && pair.contains("1"));
        }
    }

    #[test]
    fn test_lower_played_first_pick_comes_from_top_slice() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = games(20);
        let prefs = PreferenceConfig {
            prefer_lower_played: true,
            ..PreferenceConfig::default()
        };
        // played = (20 - i) * 3, so ids 19 and 18 are the least played.
        for _ in 0..500 {
            let pair = select_pair(&pool, &prefs, None, &[], &mut rng).unwrap();
            assert!(["19", "18"].contains(&pair.a.appid.as_str()), "picked {}", pair.a.appid);
        }
    }

    #[test]
    fn test_challenger_is_always_side_a() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool = games(30);
        for _ in 0..300 {
            let pair = select_pair(&pool, &PreferenceConfig::default(), Some(&pool[12]), &[], &mut rng).unwrap();
            assert_eq!(pair.a.appid, "12");
            assert_ne!(pair.b.appid, "12");
        }
    }

    #[test]
    fn test_challenger_close_rating_picks_neighbours() {
        let mut rng = StdRng::seed_from_u64(9);
        let pool = games(30);
        let prefs = PreferenceConfig {
            prefer_close_rating: true,
            ..PreferenceConfig::default()
        };
        // Ratings step by 10, so the closest to id 12 are ids 11 and 13.
        for _ in 0..300 {
            let pair = select_pair(&pool, &prefs, Some(&pool[12]), &[], &mut rng).unwrap();
            let distance = (pair.b.rating - pair.a.rating).abs();
            assert!(distance <= 20.0, "distance {distance}");
        }
    }

    #[test]
    fn test_challenger_far_rating_picks_extremes() {
        let mut rng = StdRng::seed_from_u64(13);
        let pool = games(20);
        let prefs = PreferenceConfig {
            prefer_far_rating: true,
            ..PreferenceConfig::default()
        };
        for _ in 0..200 {
            let pair = select_pair(&pool, &prefs, Some(&pool[0]), &[], &mut rng).unwrap();
            assert!(["19", "18"].contains(&pair.b.appid.as_str()));
        }
    }

    #[test]
    fn test_close_rating_takes_precedence_over_far() {
        let mut rng = StdRng::seed_from_u64(17);
        let pool = games(20);
        let prefs = PreferenceConfig {
            prefer_close_rating: true,
            prefer_far_rating: true,
            ..PreferenceConfig::default()
        };
        for _ in 0..200 {
            let pair = select_pair(&pool, &prefs, Some(&pool[0]), &[], &mut rng).unwrap();
            assert!(["1", "2"].contains(&pair.b.appid.as_str()));
        }
    }

    #[test]
    fn test_challenger_from_outside_the_candidates() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = games(4);
        let outsider = Game::new("99", "Outsider");
        for _ in 0..50 {
            let pair = select_pair(&pool, &PreferenceConfig::default(), Some(&outsider), &[], &mut rng).unwrap();
            assert_eq!(pair.a.appid, "99");
            assert!(pool.iter().any(|g| g.appid == pair.b.appid));
        }
    }

    #[test]
    fn test_challenger_alone_in_candidates_has_no_opponent() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = games(2);
        let lonely = vec![pool[0].clone(), pool[0].clone()];
        let err = select_pair(&lonely, &PreferenceConfig::default(), Some(&pool[0]), &[], &mut rng).unwrap_err();
        assert!(matches!(err, RankError::InsufficientCandidates { found: 1 }));
    }

    #[test]
    fn test_new_choices_avoid_recent_games() {
        let mut rng = StdRng::seed_from_u64(21);
        let pool = games(4);
        let prefs = PreferenceConfig {
            prefer_new_choices: true,
            recent_window: 2,
            ..PreferenceConfig::default()
        };
        // Games 0 and 1 fell out of the window; 2 and 3 are recent.
        let history = vec![entry("0", "1"), entry("2", "3"), entry("3", "2")];

        for _ in 0..200 {
            let pair = select_pair(&pool, &prefs, None, &history, &mut rng).unwrap();
            assert!(["0", "1"].contains(&pair.a.appid.as_str()));
        }
    }

    #[test]
    fn test_recently_seen_ignored_without_preference() {
        let history = vec![entry("0", "1")];
        assert!(recently_seen(&history, &PreferenceConfig::default()).is_empty());
    }

    #[test]
    fn test_sort_key_priority_order() {
        let prefs = PreferenceConfig {
            prefer_new_choices: true,
            prefer_lower_played: true,
            prefer_close_rating: true,
            ..PreferenceConfig::default()
        };
        let reference = Game::new("ref", "Reference");
        let mut fresh_but_played = Game::new("a", "A");
        fresh_but_played.played = 50;
        let mut seen_unplayed = Game::new("b", "B");
        seen_unplayed.played = 0;
        let seen: HashSet<&str> = ["b"].into_iter().collect();

        let ranked = rank_candidates(vec![&seen_unplayed, &fresh_but_played], &prefs, &seen, Some(&reference));
        assert_eq!(ranked[0].appid, "a");
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let pool = games(50);
        let prefs = PreferenceConfig::default();
        let first = select_pair(&pool, &prefs, None, &[], &mut StdRng::seed_from_u64(99)).unwrap();
        let second = select_pair(&pool, &prefs, None, &[], &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }
}
