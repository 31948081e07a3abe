use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::{ApiError, ApiResult, AppState};
use crate::api::models::{
    GameHistoryResponse, GameInfo, HistoryResponse, ImportResponse, LeaderboardParams, LeaderboardResponse, LimitParams,
    SearchParams, SearchResponse, StatusResponse,
};
use crate::domain::{parse_import_entries, Game};

const DEFAULT_RANKED_LIMIT: usize = 200;
const DEFAULT_LEADERBOARD_LIMIT: usize = 100;

pub async fn get_ranked(State(state): State<Arc<AppState>>, Query(params): Query<LimitParams>) -> ApiResult<LeaderboardResponse> {
    let board = state
        .catalog
        .leaderboard(None, params.limit.unwrap_or(DEFAULT_RANKED_LIMIT))?;
    Ok(Json(LeaderboardResponse {
        count: board.count,
        games: board.games,
    }))
}

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<LeaderboardResponse> {
    let board = state.catalog.leaderboard(
        params.q.as_deref().filter(|q| !q.is_empty()),
        params.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
    )?;
    Ok(Json(LeaderboardResponse {
        count: board.count,
        games: board.games,
    }))
}

pub async fn get_search(State(state): State<Arc<AppState>>, Query(params): Query<SearchParams>) -> ApiResult<SearchResponse> {
    let results = if params.q.trim().is_empty() {
        Vec::new()
    } else {
        state.catalog.search(&params.q)?
    };
    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

pub async fn get_num_games(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    Ok(Json(json!({ "num_games": state.catalog.count_games()? })))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<BTreeMap<String, i64>> {
    Ok(Json(state.catalog.stats()?))
}

/// Every game keyed by appid.
pub async fn get_export(State(state): State<Arc<AppState>>) -> ApiResult<BTreeMap<String, Game>> {
    let games = state
        .catalog
        .all_games()?
        .into_iter()
        .map(|game| (game.appid.clone(), game))
        .collect();
    Ok(Json(games))
}

pub async fn get_game_info(State(state): State<Arc<AppState>>, Path(appid): Path<String>) -> ApiResult<GameInfo> {
    let game = state.catalog.game(&appid).map_err(ApiError::not_found)?;
    Ok(Json(GameInfo::from(game)))
}

pub async fn get_game_history(
    State(state): State<Arc<AppState>>,
    Path(appid): Path<String>,
) -> ApiResult<GameHistoryResponse> {
    state.catalog.game(&appid).map_err(ApiError::not_found)?;
    let history = state.catalog.game_history(&appid)?;
    Ok(Json(GameHistoryResponse {
        count: history.len(),
        history,
    }))
}

pub async fn delete_game(State(state): State<Arc<AppState>>, Path(appid): Path<String>) -> ApiResult<StatusResponse> {
    state.catalog.delete_game(&appid).map_err(ApiError::not_found)?;
    Ok(Json(StatusResponse::ok(format!("Game {appid} deleted"))))
}

/// Serves the cached image, or redirects to the remote one until the cache has it.
pub async fn get_game_image(
    State(state): State<Arc<AppState>>,
    Path(appid): Path<String>,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    let game = state.catalog.game(&appid).map_err(ApiError::not_found)?;
    let Some(path) = game.image_path else {
        return Ok(match game.image_url {
            Some(url) => Redirect::temporary(&url).into_response(),
            None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "no image for game" }))).into_response(),
        });
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => Ok(response.into_response()),
        Err(never) => match never {},
    }
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> ApiResult<HistoryResponse> {
    let history = state.catalog.history()?;
    Ok(Json(HistoryResponse {
        count: history.len(),
        history,
    }))
}

/// Accepts a list of entries or an object keyed by appid.
pub async fn post_import(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResult<ImportResponse> {
    let batch = parse_import_entries(&body)?;
    let summary = state.catalog.import(&batch)?;
    Ok(Json(ImportResponse {
        imported: summary.imported,
        added: summary.added,
        total: summary.total,
    }))
}
