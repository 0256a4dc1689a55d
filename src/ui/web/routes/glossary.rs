use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;

use super::{ApiJson, ApiResponse, run_blocking};
use crate::ui::web::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct TermReq {
    pub(crate) source: String,
    pub(crate) target: String,
}

pub(crate) async fn update_term(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TermReq>,
) -> ApiResponse {
    let lib = state.library.clone();
    run_blocking("update_glossary_term", move || {
        lib.update_glossary_term(&id, &req.source, &req.target)?;
        Ok(json!({}))
    })
    .await
}
