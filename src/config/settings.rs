use std::path::PathBuf;

use crate::rating::DEFAULT_RATING;

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub starting_rating: f64,
    /// K-factor for explicit votes.
    pub vote_k: f64,
    /// K-factor for auto-resolved passes.
    pub pass_k: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            starting_rating: DEFAULT_RATING,
            vote_k: 48.0,
            pass_k: 24.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: PathBuf,
    pub snapshot_dir: PathBuf,
    pub image_cache_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/wishlist_ranker.db"),
            snapshot_dir: PathBuf::from("data/snapshots"),
            image_cache_dir: PathBuf::from("data/cache"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl StorageSettings {
    /// Defaults overridden by `DATABASE_PATH`, `SNAPSHOT_DIR`,
    /// `IMAGE_CACHE_DIR` and `STATIC_DIR`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: env_path("DATABASE_PATH", defaults.database_path),
            snapshot_dir: env_path("SNAPSHOT_DIR", defaults.snapshot_dir),
            image_cache_dir: env_path("IMAGE_CACHE_DIR", defaults.image_cache_dir),
            static_dir: env_path("STATIC_DIR", defaults.static_dir),
        }
    }
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(name).map(PathBuf::from).unwrap_or(default)
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Config is passed explicitly to every service rather than read globally.
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            storage: StorageSettings::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_k_factors() {
        let rating = RatingSettings::default();
        assert_eq!(rating.vote_k, 48.0);
        assert_eq!(rating.pass_k, 24.0);
        assert_eq!(rating.starting_rating, 1500.0);
    }

    #[test]
    fn test_env_path_falls_back() {
        let path = env_path("WISHLIST_RANKER_SURELY_UNSET", PathBuf::from("x"));
        assert_eq!(path, PathBuf::from("x"));
    }
}
