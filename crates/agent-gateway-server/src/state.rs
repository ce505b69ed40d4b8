use crate::configuration::Settings;
use agent_gateway::gateway::AgentGateway;
use chrono::Local;
use std::sync::Arc;

const TIMESTAMP_FORMAT: &str = "%m-%d-%Y at %H:%M:%S";

/// Local time in the format reported by the root endpoint
pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Shared application state. Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AgentGateway>,
    pub started_at: String,
    pub sample_env_var: String,
    pub model: Option<String>,
    pub enable_agent_management: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_gateway(settings, AgentGateway::new(settings.gateway_config()))
    }

    pub fn with_gateway(settings: &Settings, gateway: AgentGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            started_at: timestamp(),
            sample_env_var: settings.sample_env_var.clone(),
            model: settings.model_deployment_name.clone(),
            enable_agent_management: settings.enable_agent_management,
        }
    }
}
