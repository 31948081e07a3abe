use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::rating::DEFAULT_RATING;

pub type AppId = String;

/// A wishlist entry being ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub appid: AppId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub played: u32,
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

impl Game {
    pub fn new(appid: impl Into<AppId>, title: impl Into<String>) -> Self {
        Self {
            appid: appid.into(),
            title: title.into(),
            image_url: None,
            image_path: None,
            rating: DEFAULT_RATING,
            wins: 0,
            losses: 0,
            played: 0,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Win percentage rounded to one decimal, 0 for unplayed games.
    pub fn win_rate_percent(&self) -> f64 {
        if self.played == 0 {
            return 0.0;
        }
        let percent = 100.0 * self.wins as f64 / self.played as f64;
        (percent * 10.0).round() / 10.0
    }

    /// Cached image if present, otherwise the remote URL.
    pub fn display_image(&self) -> Option<&str> {
        self.image_path.as_deref().or(self.image_url.as_deref())
    }

    pub fn matches_title(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.to_lowercase())
    }

    pub(crate) fn record_win(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.wins += 1;
        self.played += 1;
    }

    pub(crate) fn record_loss(&mut self, new_rating: f64) {
        self.rating = new_rating;
        self.losses += 1;
        self.played += 1;
    }
}

/// One resolved comparison. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub winner: AppId,
    pub loser: AppId,
    pub r_w_before: f64,
    pub r_l_before: f64,
    pub r_w_after: f64,
    pub r_l_after: f64,
    pub k: f64,
    #[serde(rename = "pass", default)]
    pub is_pass: bool,
    pub recorded_at: NaiveDateTime,
}

impl HistoryEntry {
    pub fn involves(&self, appid: &str) -> bool {
        self.winner == appid || self.loser == appid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
    pub games: Vec<AppId>,
}

impl Genre {
    /// Genre ids are derived from the display name.
    pub fn id_for_name(name: &str) -> String {
        name.to_lowercase().replace(' ', "_")
    }
}

/// Per-request toggles that bias how pairs are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub prefer_close_rating: bool,
    pub prefer_far_rating: bool,
    pub prefer_lower_played: bool,
    pub prefer_new_choices: bool,
    #[serde(rename = "choices_history_length", alias = "recent_window")]
    pub recent_window: usize,
}

pub const DEFAULT_RECENT_WINDOW: usize = 30;

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            prefer_close_rating: false,
            prefer_far_rating: false,
            prefer_lower_played: false,
            prefer_new_choices: false,
            recent_window: DEFAULT_RECENT_WINDOW,
        }
    }
}

/// Preferences the frontend persists between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub winner_stays_on: bool,
    #[serde(flatten)]
    pub preferences: PreferenceConfig,
}
