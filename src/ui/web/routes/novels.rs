use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;

use super::{ApiJson, ApiResponse, run_blocking};
use crate::library::models::MetadataUpdate;
use crate::ui::web::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct AddNovelReq {
    pub(crate) url: String,
}

pub(crate) async fn list_novels(State(state): State<AppState>) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("list_novels", move || {
        let novels = lib.list_novels()?;
        Ok(json!({ "novels": novels }))
    })
    .await
}

pub(crate) async fn add_novel(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddNovelReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("add_novel", move || {
        let novel = lib.add_novel(&req.url)?;
        Ok(json!({ "novel": novel }))
    })
    .await
}

pub(crate) async fn get_novel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("get_novel", move || {
        let novel = lib.get_novel(&id)?;
        Ok(json!({ "novel": novel }))
    })
    .await
}

pub(crate) async fn delete_novel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("delete_novel", move || {
        lib.delete_novel(&id)?;
        Ok(json!({}))
    })
    .await
}

pub(crate) async fn update_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<MetadataUpdate>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("update_novel_metadata", move || {
        lib.update_novel_metadata(&id, update)?;
        Ok(json!({}))
    })
    .await
}

pub(crate) async fn sync_novel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("sync_novel", move || {
        let report = lib.sync_novel(&id)?;
        Ok(json!({ "new_chapters": report.new_chapters }))
    })
    .await
}

pub(crate) async fn library_stats(State(state): State<AppState>) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("library_stats", move || {
        let stats = lib.library_stats()?;
        Ok(json!({ "stats": stats }))
    })
    .await
}
