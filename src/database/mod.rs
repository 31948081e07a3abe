pub mod connection;
pub mod games;
pub mod genres;
pub mod history;
pub mod settings;
pub mod setup;
pub mod snapshots;
pub mod stats;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};

/// Name of the counter bumped once per resolved match.
pub const TOTAL_PLAYED: &str = "total_played";
