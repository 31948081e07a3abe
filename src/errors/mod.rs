use thiserror::Error;

/// Failures surfaced to callers of the ranking core and the catalog.
///
/// All of them are terminal for the call: nothing in the core is retried.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("need at least 2 games to form a pair, found {found}")]
    InsufficientCandidates { found: usize },

    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error("game {0} cannot be matched against itself")]
    SameGame(String),

    #[error("k-factor must be a positive finite number, got {0}")]
    InvalidKFactor(f64),

    #[error("genre not found: {0}")]
    GenreNotFound(String),

    #[error("genre already exists: {0}")]
    GenreExists(String),

    #[error("game {appid} is not in genre {genre_id}")]
    NotInGenre { genre_id: String, appid: String },

    #[error("invalid import payload: {0}")]
    InvalidImport(String),

    #[error("snapshot version {0} not found")]
    SnapshotNotFound(u32),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type RankResult<T> = Result<T, RankError>;

impl RankError {
    /// True for failures the user can fix by changing the request.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, RankError::Storage(_))
    }
}
