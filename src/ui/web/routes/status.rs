use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::ui::web::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let binds: Vec<String> = state.bind_addrs.iter().map(|a| a.to_string()).collect();
    Json(json!({
        "success": true,
        "version": VERSION,
        "library_root": state.library_root.to_string_lossy(),
        "bind_addrs": binds,
    }))
}
