use axum::extract::{Query, State};
use axum::response::Json;
use std::sync::Arc;

use super::{AppState, ApiResult};
use crate::api::models::{KParams, PairParams, PassParams, PassResponse, VotePayload, VoteResponse};
use crate::matchmaking::{self, Pair};

pub async fn get_pair(State(state): State<Arc<AppState>>, Query(params): Query<PairParams>) -> ApiResult<Pair> {
    let prefs = params.preferences();
    let pair = {
        let mut rng = rand::thread_rng();
        matchmaking::next_pair(&state.store, &prefs, params.challenger(), params.genre(), &mut rng)?
    };

    state.images.enqueue(&pair.a);
    state.images.enqueue(&pair.b);
    Ok(Json(pair))
}

pub async fn post_vote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<KParams>,
    Json(payload): Json<VotePayload>,
) -> ApiResult<VoteResponse> {
    let k = params.k.unwrap_or(state.config.rating.vote_k);
    let outcome = state.resolver.resolve_vote(&payload.winner_appid, &payload.loser_appid, k)?;

    Ok(Json(VoteResponse {
        winner: outcome.winner.appid,
        new_rating_winner: outcome.winner.rating,
        new_rating_loser: outcome.loser.rating,
    }))
}

pub async fn post_pass(State(state): State<Arc<AppState>>, Query(params): Query<PassParams>) -> ApiResult<PassResponse> {
    let k = params.k.unwrap_or(state.config.rating.pass_k);
    let outcome = state.resolver.resolve_pass(&params.a_appid, &params.b_appid, k)?;

    Ok(Json(PassResponse {
        winner: outcome.winner.appid,
        via: "pass",
    }))
}
