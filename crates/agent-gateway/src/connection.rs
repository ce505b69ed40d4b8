use crate::errors::{GatewayError, GatewayResult};
use std::str::FromStr;
use url::Url;

/// The parts of an AI project connection string:
/// `<host>;<subscription_id>;<resource_group>;<project_name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ConnectionString {
    /// Base url of the project's agent endpoints
    pub fn endpoint(&self) -> GatewayResult<Url> {
        let host = self.host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        let endpoint = format!(
            "{}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            base, self.subscription_id, self.resource_group, self.project_name
        );

        Url::parse(&endpoint).map_err(|e| {
            GatewayError::ConnectionFailure(format!("invalid project endpoint '{}': {}", endpoint, e))
        })
    }
}

impl FromStr for ConnectionString {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(';').map(str::trim).collect();

        match parts.as_slice() {
            [host, subscription_id, resource_group, project_name]
                if parts.iter().all(|p| !p.is_empty()) =>
            {
                Ok(ConnectionString {
                    host: host.to_string(),
                    subscription_id: subscription_id.to_string(),
                    resource_group: resource_group.to_string(),
                    project_name: project_name.to_string(),
                })
            }
            _ => Err(GatewayError::ConnectionFailure(
                "connection string must look like '<host>;<subscription_id>;<resource_group>;<project_name>'"
                    .to_string(),
            )),
        }
    }
}
