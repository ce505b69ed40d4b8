use async_trait::async_trait;
use chrono::Local;
use std::fmt::Display;
use std::sync::Arc;

use crate::agents::base::AgentsApi;
use crate::agents::project::ProjectClient;
use crate::config::GatewayConfig;
use crate::credentials::{DefaultCredential, TokenCredential};
use crate::errors::{GatewayError, GatewayResult};
use crate::models::agent::{AgentDescriptor, NewAgent, Toolset};
use crate::models::message::NewMessage;
use crate::models::run::RunStatus;

/// Returned by [`AgentGateway::ask_agent`] whenever no reply could be produced
pub const FALLBACK_TEXT: &str = "I don't know what to say.";

pub const DEFAULT_INSTRUCTIONS: &str = "You are a helpful AI agent.";

/// Builds a fresh client for the agent service
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &GatewayConfig) -> GatewayResult<Arc<dyn AgentsApi>>;
}

/// Connects to the project named by the configured connection string
#[derive(Default)]
pub struct ProjectConnector {
    credential: Option<Arc<dyn TokenCredential>>,
}

impl ProjectConnector {
    /// Resolve credentials through the default chain on every connect
    pub fn new() -> Self {
        Self { credential: None }
    }

    /// Always authenticate with the given credential
    pub fn with_credential(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            credential: Some(credential),
        }
    }
}

#[async_trait]
impl Connector for ProjectConnector {
    async fn connect(&self, config: &GatewayConfig) -> GatewayResult<Arc<dyn AgentsApi>> {
        let conn_str = config
            .connection_string
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::ConnectionFailure("no project connection string configured".into())
            })?;

        let credential: Arc<dyn TokenCredential> = match &self.credential {
            Some(credential) => Arc::clone(credential),
            None => Arc::new(
                DefaultCredential::from_env()
                    .map_err(|e| GatewayError::ConnectionFailure(e.to_string()))?,
            ),
        };

        let client = ProjectClient::from_connection_string(conn_str, credential)?
            .with_api_version(config.api_version.clone())
            .with_poll_interval(config.poll_interval);
        client.authenticate().await?;

        tracing::debug!("Connected to project endpoint {}", client.endpoint());
        Ok(Arc::new(client))
    }
}

/// Optional overrides for a new agent; anything left out gets a default
#[derive(Debug, Clone, Default)]
pub struct AgentRequest {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub model: Option<String>,
    pub toolset: Option<Toolset>,
}

impl AgentRequest {
    /// Fill in defaults. The timestamped name is taken at call time.
    fn resolve(self, config: &GatewayConfig) -> NewAgent {
        let name = self
            .name
            .unwrap_or_else(|| format!("Agent {}", Local::now().format("%Y%m%d%H%M")));
        let instructions = self
            .instructions
            .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string());
        let model = self.model.or_else(|| config.model_deployment_name.clone());

        NewAgent::new(name, instructions)
            .with_model(model)
            .with_toolset(self.toolset)
    }
}

/// Turns a failed step into `None`, logging why
trait LogFailure<T> {
    fn log_failure(self, context: &str) -> Option<T>;
}

impl<T, E: Display> LogFailure<T> for Result<T, E> {
    fn log_failure(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("{}: {}", context, e);
                None
            }
        }
    }
}

fn non_empty(id: String, what: &str) -> Option<String> {
    if id.is_empty() {
        tracing::error!("Service returned a {} without an id", what);
        None
    } else {
        Some(id)
    }
}

/// Stateless front for the agent service.
///
/// Every operation connects anew, so no client, token or thread outlives the
/// call that created it. Failures never escape: they are logged and turned
/// into `None` (or the fallback text for [`AgentGateway::ask_agent`]).
pub struct AgentGateway {
    config: GatewayConfig,
    connector: Arc<dyn Connector>,
}

impl AgentGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_connector(config, Arc::new(ProjectConnector::new()))
    }

    pub fn with_connector(config: GatewayConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn connect(&self) -> Option<Arc<dyn AgentsApi>> {
        self.connector
            .connect(&self.config)
            .await
            .log_failure("Failed to connect to the agent service")
    }

    pub async fn create_agent(&self, request: AgentRequest) -> Option<AgentDescriptor> {
        let client = self.connect().await?;
        let agent = request.resolve(&self.config);
        tracing::info!("Creating agent '{}'", agent.name);
        client
            .create_agent(&agent)
            .await
            .log_failure("Failed to create agent")
    }

    pub async fn list_agents(&self) -> Option<Vec<AgentDescriptor>> {
        let client = self.connect().await?;
        client
            .list_all_agents()
            .await
            .log_failure("Failed to list agents")
    }

    /// Ask an agent a single question in a new thread.
    ///
    /// Always returns some text: the agent's latest reply, or [`FALLBACK_TEXT`]
    /// if any step on the way failed.
    pub async fn ask_agent(&self, agent_id: &str, prompt: &str) -> String {
        tracing::info!("Asking agent '{}'...", agent_id);
        self.converse(agent_id, prompt)
            .await
            .unwrap_or_else(|| FALLBACK_TEXT.to_string())
    }

    async fn converse(&self, agent_id: &str, prompt: &str) -> Option<String> {
        let client = self.connect().await?;

        let thread = client
            .create_thread()
            .await
            .log_failure("Failed to create thread")?;
        let thread_id = non_empty(thread.id, "thread")?;
        tracing::debug!("Created thread, ID: {}", thread_id);

        let message = client
            .create_message(&thread_id, &NewMessage::user(prompt))
            .await
            .log_failure("Failed to create message")?;
        let message_id = non_empty(message.id, "message")?;
        tracing::debug!("Created message, ID: {}", message_id);

        // A failed run still falls through to reading the thread
        match client.create_and_process_run(&thread_id, agent_id).await {
            Ok(run) if run.status == RunStatus::Failed => {
                let reason = run
                    .last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no error reported".to_string());
                tracing::warn!("Run failed: {}", reason);
            }
            Ok(run) => tracing::debug!("Run finished with status: {}", run.status),
            Err(e) => tracing::error!("Failed to process run: {}", e),
        }

        let messages = client
            .list_messages(&thread_id)
            .await
            .log_failure("Failed to list messages")?;

        let Some(latest) = messages.data.first() else {
            tracing::warn!("Thread {} has no messages", thread_id);
            return None;
        };

        let content = latest
            .first_content()
            .log_failure("Error accessing latest content")?;
        let text = content
            .text_value()
            .log_failure("Error accessing latest content")??;

        Some(text.to_string())
    }
}
