use crate::state::{timestamp, AppState};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RootResponse {
    version: String,
    date_start: String,
    date_request: String,
    env_var: String,
    model: Option<String>,
}

async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        date_start: state.started_at.clone(),
        date_request: timestamp(),
        env_var: state.sample_env_var.clone(),
        model: state.model.clone(),
    })
}

pub fn routes(state: AppState) -> Router {
    Router::new().route("/", get(root_handler)).with_state(state)
}
