use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::AppState;

/// Detail pages are rendered client side; the path segment is read by the page script.
pub async fn game_page(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    serve_page(&state, "game.html", request).await
}

pub async fn genre_page(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    serve_page(&state, "genre.html", request).await
}

async fn serve_page(state: &AppState, page: &str, request: Request<Body>) -> Response {
    let path = state.config.storage.static_dir.join(page);
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
