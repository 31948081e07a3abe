use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::UserSettings;

const USER_SETTINGS_KEY: &str = "user_settings";

/// Stored settings, or defaults when nothing was saved yet.
pub fn load_settings(conn: &Connection) -> Result<UserSettings> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![USER_SETTINGS_KEY],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to read settings")?;

    match raw {
        Some(json) => serde_json::from_str(&json).context("Failed to parse stored settings"),
        None => Ok(UserSettings::default()),
    }
}

pub fn save_settings(conn: &Connection, settings: &UserSettings) -> Result<()> {
    let json = serde_json::to_string(settings).context("Failed to serialize settings")?;
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![USER_SETTINGS_KEY, json],
    )
    .context("Failed to save settings")
    .map(|_| ())
}
