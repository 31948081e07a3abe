use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::error;
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::RankError;
use crate::matchmaking::MatchResolver;
use crate::services::{CatalogService, ImageQueue, MaintenanceService};
use crate::store::SqliteStore;

pub mod admin;
pub mod games;
pub mod genres;
pub mod matches;
pub mod pages;

pub struct AppState {
    pub store: SqliteStore,
    pub resolver: MatchResolver<SqliteStore>,
    pub catalog: CatalogService,
    pub maintenance: MaintenanceService,
    pub images: ImageQueue,
    pub config: AppConfig,
}

/// Error body returned by every JSON endpoint: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// For lookups, where an unknown id means the resource is missing.
    pub fn not_found(err: RankError) -> Self {
        match err {
            RankError::UnknownGame(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RankError> for ApiError {
    fn from(err: RankError) -> Self {
        let status = match &err {
            RankError::InsufficientCandidates { .. }
            | RankError::UnknownGame(_)
            | RankError::SameGame(_)
            | RankError::InvalidKFactor(_)
            | RankError::InvalidImport(_) => StatusCode::BAD_REQUEST,
            RankError::GenreNotFound(_) | RankError::NotInGenre { .. } | RankError::SnapshotNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RankError::GenreExists(_) => StatusCode::CONFLICT,
            RankError::Storage(e) => {
                error!("Request failed: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        RankError::Storage(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
