use std::collections::HashSet;

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;

use super::{ApiJson, ApiQuery, ApiResponse, run_blocking};
use crate::ui::web::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct TextReq {
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchDeleteReq {
    pub(crate) chapter_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentQuery {
    pub(crate) url: String,
}

pub(crate) async fn open_chapter(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("open_chapter", move || {
        let view = lib.open_chapter(&id, &number)?;
        Ok(json!({ "view": view }))
    })
    .await
}

pub(crate) async fn fetch_content(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ContentQuery>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("fetch_chapter_content", move || {
        let content = lib.fetch_chapter_content(&q.url)?;
        Ok(json!({ "content": content }))
    })
    .await
}

pub(crate) async fn save_content(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
    ApiJson(req): ApiJson<TextReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("save_chapter_content", move || {
        lib.save_chapter_content(&id, &number, req.text)?;
        Ok(json!({}))
    })
    .await
}

pub(crate) async fn translate(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
    ApiJson(req): ApiJson<TextReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("translate_chapter", move || {
        let translation = lib.translate_chapter(&id, &number, &req.text)?;
        Ok(json!({ "translation": translation }))
    })
    .await
}

pub(crate) async fn retranslate(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
    ApiJson(req): ApiJson<TextReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("retranslate_chapter", move || {
        let translation = lib.retranslate_chapter(&id, &number, &req.text)?;
        Ok(json!({ "translation": translation }))
    })
    .await
}

pub(crate) async fn save_manual_translation(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
    ApiJson(req): ApiJson<TextReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("save_manual_translation", move || {
        lib.save_manual_translation(&id, &number, &req.text)?;
        Ok(json!({}))
    })
    .await
}

pub(crate) async fn delete_chapter(
    State(state): State<AppState>,
    Path((id, number)): Path<(String, String)>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("delete_chapter", move || {
        let removed = lib.delete_chapter(&id, &number)?;
        Ok(json!({ "removed": removed }))
    })
    .await
}

pub(crate) async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BatchDeleteReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("delete_chapters_batch", move || {
        let numbers: HashSet<String> = req.chapter_numbers.into_iter().collect();
        let removed = lib.delete_chapters(&id, &numbers)?;
        Ok(json!({ "removed": removed }))
    })
    .await
}
