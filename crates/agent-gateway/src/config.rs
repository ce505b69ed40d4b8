use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the gateway needs to reach the agent service.
///
/// Built once at startup and handed to [`crate::gateway::AgentGateway`];
/// nothing in the library reads process-wide configuration on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub connection_string: Option<String>,
    pub model_deployment_name: Option<String>,
    pub api_version: String,
    pub poll_interval: Duration,
}

impl GatewayConfig {
    pub fn new(connection_string: Option<String>, model_deployment_name: Option<String>) -> Self {
        Self {
            connection_string,
            model_deployment_name,
            ..Default::default()
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            model_deployment_name: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
