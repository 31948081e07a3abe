pub mod elo;

pub use elo::{expected_score, update_elo, RatingUpdate};

/// Rating every game starts with on import and after a reset.
pub const DEFAULT_RATING: f64 = 1500.0;
