use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::api::handlers::{
    admin::{get_settings, list_backups, post_settings, reset_ratings, restore_version, save_snapshot},
    games::{
        delete_game, get_export, get_game_history, get_game_image, get_game_info, get_history, get_leaderboard,
        get_num_games, get_ranked, get_search, get_stats, post_import,
    },
    genres::{add_game_to_genre, create_genre, delete_genre, get_genre, get_genre_leaderboard, list_genres, remove_game_from_genre},
    matches::{get_pair, post_pass, post_vote},
    pages::{game_page, genre_page},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.storage.static_dir.clone();

    Router::new()
        .route("/pair", get(get_pair))
        .route("/vote", post(post_vote))
        .route("/pass", post(post_pass))
        .route("/ranked", get(get_ranked))
        .route("/leaderboard", get(get_leaderboard))
        .route("/search", get(get_search))
        .route("/num_games", get(get_num_games))
        .route("/stats", get(get_stats))
        .route("/download/export.json", get(get_export))
        .route("/history", get(get_history))
        .route("/import/json", post(post_import))
        .route("/game_info/:appid", get(get_game_info))
        .route("/game_history/:appid", get(get_game_history))
        .route("/game_image/:appid", get(get_game_image))
        .route("/delete_game/:appid", post(delete_game))
        .route("/settings", get(get_settings).post(post_settings))
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/:id", get(get_genre).delete(delete_genre))
        .route("/genres/:id/leaderboard", get(get_genre_leaderboard))
        .route("/genres/:id/games", post(add_game_to_genre))
        .route("/genres/:id/games/:appid", delete(remove_game_from_genre))
        .route("/reset_ratings", post(reset_ratings))
        .route("/save_snapshot", post(save_snapshot))
        .route("/list_backups", get(list_backups))
        .route("/restore_version", post(restore_version))
        .route("/game/:appid", get(game_page))
        .route("/genre/:id", get(genre_page))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
}
