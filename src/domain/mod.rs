pub mod import;
pub mod models;

pub use import::{parse_import_entries, ImportBatch, ImportEntry};
pub use models::*;
