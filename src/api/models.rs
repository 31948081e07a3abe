use serde::{Deserialize, Serialize};

use crate::domain::{Game, HistoryEntry, PreferenceConfig, DEFAULT_RECENT_WINDOW};
use crate::services::catalog::{HistoryView, RankedGame};

/// Query string of `GET /pair`.
#[derive(Debug, Default, Deserialize)]
pub struct PairParams {
    #[serde(default)]
    pub prefer_close_rating: bool,
    #[serde(default)]
    pub prefer_far_rating: bool,
    #[serde(default)]
    pub prefer_lower_played: bool,
    #[serde(default)]
    pub prefer_new_choices: bool,
    pub choices_history_length: Option<usize>,
    pub challenger: Option<String>,
    pub genre: Option<String>,
}

impl PairParams {
    pub fn preferences(&self) -> PreferenceConfig {
        PreferenceConfig {
            prefer_close_rating: self.prefer_close_rating,
            prefer_far_rating: self.prefer_far_rating,
            prefer_lower_played: self.prefer_lower_played,
            prefer_new_choices: self.prefer_new_choices,
            recent_window: self.choices_history_length.unwrap_or(DEFAULT_RECENT_WINDOW),
        }
    }

    /// Empty strings from the frontend mean "not set".
    pub fn challenger(&self) -> Option<&str> {
        non_empty(self.challenger.as_deref())
    }

    pub fn genre(&self) -> Option<&str> {
        non_empty(self.genre.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct KParams {
    pub k: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VotePayload {
    #[serde(alias = "winner")]
    pub winner_appid: String,
    #[serde(alias = "loser")]
    pub loser_appid: String,
}

#[derive(Debug, Deserialize)]
pub struct PassParams {
    pub a_appid: String,
    pub b_appid: String,
    pub k: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct GenrePayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreGamePayload {
    pub appid: String,
}

/// Snapshot versions arrive either as numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SnapshotVersion {
    Number(u32),
    Text(String),
}

impl SnapshotVersion {
    pub fn parse(&self) -> Option<u32> {
        match self {
            SnapshotVersion::Number(v) => Some(*v),
            SnapshotVersion::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestorePayload {
    pub version: SnapshotVersion,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub winner: String,
    pub new_rating_winner: f64,
    pub new_rating_loser: f64,
}

#[derive(Serialize)]
pub struct PassResponse {
    pub winner: String,
    pub via: &'static str,
}

/// A game with its win rate, as shown on the detail page.
#[derive(Serialize)]
pub struct GameInfo {
    #[serde(flatten)]
    pub game: Game,
    pub winrate: f64,
}

impl From<Game> for GameInfo {
    fn from(game: Game) -> Self {
        let winrate = game.win_rate_percent();
        Self { game, winrate }
    }
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub count: usize,
    pub games: Vec<RankedGame>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<Game>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub history: Vec<HistoryView>,
}

#[derive(Serialize)]
pub struct GameHistoryResponse {
    pub count: usize,
    pub history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub added: usize,
    pub total: i64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_params_treat_blank_as_unset() {
        let params = PairParams {
            challenger: Some(String::new()),
            genre: Some("rpg".to_string()),
            ..Default::default()
        };
        assert_eq!(params.challenger(), None);
        assert_eq!(params.genre(), Some("rpg"));
        assert_eq!(params.preferences().recent_window, DEFAULT_RECENT_WINDOW);
    }

    #[test]
    fn test_snapshot_version_accepts_numbers_and_strings() {
        let numeric: RestorePayload = serde_json::from_str(r#"{"version": 3}"#).unwrap();
        let text: RestorePayload = serde_json::from_str(r#"{"version": "4"}"#).unwrap();
        let junk: RestorePayload = serde_json::from_str(r#"{"version": "latest"}"#).unwrap();
        assert_eq!(numeric.version.parse(), Some(3));
        assert_eq!(text.version.parse(), Some(4));
        assert_eq!(junk.version.parse(), None);
    }

    #[test]
    fn test_vote_payload_accepts_short_field_names() {
        let long: VotePayload = serde_json::from_str(r#"{"winner_appid": "1", "loser_appid": "2"}"#).unwrap();
        let short: VotePayload = serde_json::from_str(r#"{"winner": "1", "loser": "2"}"#).unwrap();
        assert_eq!((long.winner_appid.as_str(), long.loser_appid.as_str()), ("1", "2"));
        assert_eq!(short.winner_appid, long.winner_appid);
    }
}
