use crate::error::ApiError;
use crate::state::AppState;
use agent_gateway::gateway::AgentRequest;
use agent_gateway::models::agent::{AgentDescriptor, Toolset};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct AskRequest {
    agent_id: String,
    user_input: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateRequest {
    agent_name: Option<String>,
    agent_instructions: Option<String>,
    agent_model: Option<String>,
    agent_toolset: Option<Toolset>,
}

impl From<CreateRequest> for AgentRequest {
    fn from(request: CreateRequest) -> Self {
        AgentRequest {
            name: request.agent_name,
            instructions: request.agent_instructions,
            model: request.agent_model,
            toolset: request.agent_toolset,
        }
    }
}

#[derive(Debug, Serialize)]
struct DataResponse<T> {
    status: u16,
    data: T,
}

impl<T> DataResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { status: 200, data })
    }
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<DataResponse<String>>, ApiError> {
    let gateway = state.gateway.clone();

    // The gateway swallows its own failures; only a crashed task reaches the caller
    let reply = tokio::spawn(async move {
        gateway
            .ask_agent(&request.agent_id, &request.user_input)
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!("Ask request failed: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(DataResponse::ok(reply))
}

async fn chat_handler(Json(request): Json<AskRequest>) -> Json<DataResponse<String>> {
    DataResponse::ok(format!(
        "This is a temporary response from the Azure AI Agent for {}.",
        request.agent_id
    ))
}

async fn create_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<DataResponse<AgentDescriptor>>, ApiError> {
    state
        .gateway
        .create_agent(request.into())
        .await
        .map(DataResponse::ok)
        .ok_or_else(|| ApiError::Internal("Error creating agent.".to_string()))
}

async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<AgentDescriptor>>>, ApiError> {
    state
        .gateway
        .list_agents()
        .await
        .map(DataResponse::ok)
        .ok_or_else(|| ApiError::Internal("Error listing agents.".to_string()))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/agents/ask", post(ask_handler))
        .route("/agents/chat", post(chat_handler));

    if state.enable_agent_management {
        router = router
            .route("/agents/create", post(create_handler))
            .route("/agents/list", post(list_handler));
    }

    router.with_state(state)
}
