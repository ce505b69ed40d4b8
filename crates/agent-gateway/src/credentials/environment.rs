use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::env;

use super::{token_from_response, AccessToken, TokenCredential};

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Service principal (client secret) credential configured from the environment
pub struct EnvironmentCredential {
    client: Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl EnvironmentCredential {
    pub fn new<T: Into<String>, C: Into<String>, S: Into<String>>(
        tenant_id: T,
        client_id: C,
        client_secret: S,
    ) -> Self {
        Self {
            client: Client::new(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_authority_host<S: Into<String>>(mut self, authority_host: S) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
    /// Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        let tenant_id = env::var("AZURE_TENANT_ID").ok()?;
        let client_id = env::var("AZURE_CLIENT_ID").ok()?;
        let client_secret = env::var("AZURE_CLIENT_SECRET").ok()?;

        let mut credential = Self::new(tenant_id, client_id, client_secret);
        if let Ok(host) = env::var("AZURE_AUTHORITY_HOST") {
            credential = credential.with_authority_host(host);
        }
        Some(credential)
    }

    fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &str {
        "EnvironmentCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let resp = self
            .client
            .post(self.token_endpoint())
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Failed to get token for tenant {}: {}: {}",
                self.tenant_id,
                status,
                err_text
            ));
        }

        let token_response: Value = resp.json().await?;
        token_from_response(&token_response)
    }
}
