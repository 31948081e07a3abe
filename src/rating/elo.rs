/// Points of rating difference that correspond to 10:1 odds.
const ELO_SCALE: f64 = 400.0;

/// New ratings for both sides of a decided comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingUpdate {
    pub winner: f64,
    pub loser: f64,
}

/// Probability that a game rated `rating_a` is preferred over one rated `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_SCALE))
}

/// Applies a single Elo step for a decided comparison.
///
/// The winner scores 1 and the loser 0, each measured against its own expectation.
pub fn update_elo(winner_rating: f64, loser_rating: f64, k: f64) -> RatingUpdate {
    let winner_expected = expected_score(winner_rating, loser_rating);
    let loser_expected = expected_score(loser_rating, winner_rating);

    RatingUpdate {
        winner: winner_rating + k * (1.0 - winner_expected),
        loser: loser_rating + k * (0.0 - loser_expected),
    }
}
