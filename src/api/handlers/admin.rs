use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ApiError, ApiResult, AppState};
use crate::api::models::RestorePayload;
use crate::domain::UserSettings;

#[derive(Serialize)]
pub struct SettingsSaved {
    pub status: &'static str,
    pub settings: UserSettings,
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<UserSettings> {
    Ok(Json(state.catalog.settings()?))
}

pub async fn post_settings(State(state): State<Arc<AppState>>, Json(settings): Json<UserSettings>) -> ApiResult<SettingsSaved> {
    state.catalog.save_settings(&settings)?;
    Ok(Json(SettingsSaved { status: "ok", settings }))
}

pub async fn reset_ratings(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let version = state.maintenance.reset_ratings()?;
    Ok(Json(json!({
        "message": format!("All ratings reset. Previous state saved as snapshot {version}"),
        "snapshot": version,
    })))
}

pub async fn save_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let version = state.maintenance.save_snapshot()?;
    Ok(Json(json!({
        "message": format!("Saved snapshot {version}"),
        "snapshot": version,
    })))
}

pub async fn list_backups(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let backups: Vec<String> = state
        .maintenance
        .list_snapshots()?
        .into_iter()
        .map(|v| v.to_string())
        .collect();
    Ok(Json(json!({ "backups": backups })))
}

pub async fn restore_version(State(state): State<Arc<AppState>>, Json(payload): Json<RestorePayload>) -> ApiResult<Value> {
    let version = payload
        .version
        .parse()
        .ok_or_else(|| ApiError::bad_request("version must be a snapshot number"))?;
    state.maintenance.restore(version)?;
    Ok(Json(json!({ "message": format!("Restored snapshot {version}") })))
}
