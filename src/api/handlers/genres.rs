use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ApiError, ApiResult, AppState};
use crate::api::models::{GenreGamePayload, GenrePayload, LeaderboardParams, LeaderboardResponse, StatusResponse};
use crate::domain::Genre;

const DEFAULT_LIMIT: usize = 100;

#[derive(Serialize)]
pub struct GenreCreated {
    pub status: &'static str,
    pub genre: Genre,
}

pub async fn list_genres(State(state): State<Arc<AppState>>) -> ApiResult<BTreeMap<String, Genre>> {
    let genres = state
        .catalog
        .genres()?
        .into_iter()
        .map(|genre| (genre.id.clone(), genre))
        .collect();
    Ok(Json(genres))
}

pub async fn create_genre(State(state): State<Arc<AppState>>, Json(payload): Json<GenrePayload>) -> ApiResult<GenreCreated> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("genre name must not be empty"));
    }
    let genre = state.catalog.create_genre(name)?;
    Ok(Json(GenreCreated { status: "ok", genre }))
}

pub async fn get_genre(State(state): State<Arc<AppState>>, Path(genre_id): Path<String>) -> ApiResult<Genre> {
    Ok(Json(state.catalog.genre(&genre_id)?))
}

pub async fn delete_genre(State(state): State<Arc<AppState>>, Path(genre_id): Path<String>) -> ApiResult<StatusResponse> {
    state.catalog.delete_genre(&genre_id)?;
    Ok(Json(StatusResponse::ok(format!("Genre {genre_id} deleted"))))
}

pub async fn get_genre_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<String>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<LeaderboardResponse> {
    let board = state.catalog.genre_leaderboard(
        &genre_id,
        params.q.as_deref().filter(|q| !q.is_empty()),
        params.limit.unwrap_or(DEFAULT_LIMIT),
    )?;
    Ok(Json(LeaderboardResponse {
        count: board.count,
        games: board.games,
    }))
}

pub async fn add_game_to_genre(
    State(state): State<Arc<AppState>>,
    Path(genre_id): Path<String>,
    Json(payload): Json<GenreGamePayload>,
) -> ApiResult<StatusResponse> {
    state
        .catalog
        .add_to_genre(&genre_id, &payload.appid)
        .map_err(ApiError::not_found)?;
    Ok(Json(StatusResponse::ok(format!("Game {} added to {genre_id}", payload.appid))))
}

pub async fn remove_game_from_genre(
    State(state): State<Arc<AppState>>,
    Path((genre_id, appid)): Path<(String, String)>,
) -> ApiResult<StatusResponse> {
    state.catalog.remove_from_genre(&genre_id, &appid)?;
    Ok(Json(StatusResponse::ok(format!("Game {appid} removed from {genre_id}"))))
}
