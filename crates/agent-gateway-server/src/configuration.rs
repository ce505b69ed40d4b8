use crate::error::{to_env_var, ConfigError};
use agent_gateway::config::{GatewayConfig, DEFAULT_API_VERSION};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Process settings, read from the environment (and `.env` when present).
///
/// The variable names are the keys uppercased, with `__` for nesting:
/// `PROJECT_CONNECTION_STRING`, `MODEL_DEPLOYMENT_NAME`, `SERVER__PORT`, ...
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default = "default_sample_env_var")]
    pub sample_env_var: String,
    #[serde(default)]
    pub project_connection_string: Option<String>,
    #[serde(default)]
    pub model_deployment_name: Option<String>,
    #[serde(default = "default_api_version")]
    pub agents_api_version: String,
    #[serde(default = "default_run_poll_interval_ms")]
    pub run_poll_interval_ms: u64,
    #[serde(default)]
    pub enable_agent_management: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            sample_env_var: default_sample_env_var(),
            project_connection_string: None,
            model_deployment_name: None,
            agents_api_version: default_api_version(),
            run_poll_interval_ms: default_run_poll_interval_ms(),
            enable_agent_management: false,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("sample_env_var", default_sample_env_var())?
            .set_default("agents_api_version", default_api_version())?
            .set_default("run_poll_interval_ms", default_run_poll_interval_ms())?
            .set_default("enable_agent_management", false)?
            // Layer on the environment variables
            .add_source(Environment::default().separator("__"))
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let config::ConfigError::Type { key: Some(key), .. } = &err {
                    Err(ConfigError::InvalidEnvVar {
                        env_var: to_env_var(key),
                        message: err.to_string(),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    /// What the agent gateway needs out of these settings
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            connection_string: self.project_connection_string.clone(),
            model_deployment_name: self.model_deployment_name.clone(),
            api_version: self.agents_api_version.clone(),
            poll_interval: Duration::from_millis(self.run_poll_interval_ms),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_sample_env_var() -> String {
    "default_value".to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_run_poll_interval_ms() -> u64 {
    1000
}
