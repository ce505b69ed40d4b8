// Export route modules
pub mod agents;
pub mod root;

use crate::state::AppState;
use axum::Router;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(root::routes(state.clone()))
        .merge(agents::routes(state))
}

#[cfg(test)]
pub(crate) async fn read_json(response: axum::response::Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be json")
}
