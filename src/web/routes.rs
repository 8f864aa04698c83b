use super::web_server::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "hub_path": state.config.hub_path,
        "hubs": state.registry.len(),
    }))
}
