//! Ambient credential resolution.
//!
//! Tokens are never passed in by callers. Like the usual cloud SDK behaviour, a
//! [`DefaultCredential`] walks a chain of sources (service principal from the
//! environment, managed identity, then the local `az` login) and returns the
//! first token it can get.
pub mod azure_cli;
pub mod environment;
pub mod managed_identity;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use azure_cli::AzureCliCredential;
pub use environment::EnvironmentCredential;
pub use managed_identity::ManagedIdentityCredential;

/// Scope requested for the agent service
pub const AGENTS_SCOPE: &str = "https://management.azure.com/.default";

// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 300;

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new<S: Into<String>>(token: S, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A source of bearer tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used when reporting failures
    fn name(&self) -> &str;

    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// A fixed, pre-issued token
pub struct StaticCredential {
    token: AccessToken,
}

impl StaticCredential {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: AccessToken::new(token, Utc::now() + Duration::hours(24)),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    fn name(&self) -> &str {
        "StaticCredential"
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// Tries each credential in order and returns the first token obtained
pub struct DefaultCredential {
    sources: Vec<Box<dyn TokenCredential>>,
}

impl DefaultCredential {
    pub fn new(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    /// The standard chain: environment, managed identity, Azure CLI
    pub fn from_env() -> Result<Self> {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();
        if let Some(credential) = EnvironmentCredential::from_env() {
            sources.push(Box::new(credential));
        }
        sources.push(Box::new(ManagedIdentityCredential::from_env()?));
        sources.push(Box::new(AzureCliCredential::new()));
        Ok(Self::new(sources))
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    fn name(&self) -> &str {
        "DefaultCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut failures = Vec::new();
        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    tracing::debug!("Acquired token from {}", source.name());
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!("{} unavailable: {}", source.name(), e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(anyhow!("No credential sources configured"));
        }
        Err(anyhow!(
            "No credential in the chain could provide a token:\n{}",
            failures.join("\n")
        ))
    }
}

/// Convert a `.default` scope into the resource form older token endpoints expect
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.trim_end_matches("/.default")
}

/// Read the access token and expiry out of an OAuth token response.
///
/// `expires_in` is a number from Entra ID but a string from some managed
/// identity endpoints, so both are accepted.
pub(crate) fn token_from_response(response: &Value) -> Result<AccessToken> {
    let token = response
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("access_token not found in token response"))?;

    let expires_in = response
        .get("expires_in")
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    Ok(AccessToken::new(
        token,
        Utc::now() + Duration::seconds(expires_in),
    ))
}
