use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

use super::{scope_to_resource, token_from_response, AccessToken, TokenCredential};

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

// IMDS is unreachable off Azure; don't hang the chain waiting for it
const IMDS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
enum IdentityEndpoint {
    /// App Service / Functions style endpoint with its shared secret header
    AppService { endpoint: String, header: String },
    /// The VM instance metadata service
    Imds { endpoint: String },
}

pub struct ManagedIdentityCredential {
    client: Client,
    endpoint: IdentityEndpoint,
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    /// Uses `IDENTITY_ENDPOINT`/`IDENTITY_HEADER` when present, IMDS otherwise.
    /// `AZURE_CLIENT_ID` selects a user-assigned identity.
    pub fn from_env() -> Result<Self> {
        let endpoint = match (env::var("IDENTITY_ENDPOINT"), env::var("IDENTITY_HEADER")) {
            (Ok(endpoint), Ok(header)) => IdentityEndpoint::AppService { endpoint, header },
            _ => IdentityEndpoint::Imds {
                endpoint: IMDS_ENDPOINT.to_string(),
            },
        };
        Self::new(endpoint, env::var("AZURE_CLIENT_ID").ok())
    }

    /// Talk to an IMDS-compatible endpoint at the given url
    pub fn imds<S: Into<String>>(endpoint: S, client_id: Option<String>) -> Result<Self> {
        Self::new(
            IdentityEndpoint::Imds {
                endpoint: endpoint.into(),
            },
            client_id,
        )
    }

    /// Talk to an App Service identity endpoint
    pub fn app_service<E: Into<String>, H: Into<String>>(
        endpoint: E,
        header: H,
        client_id: Option<String>,
    ) -> Result<Self> {
        Self::new(
            IdentityEndpoint::AppService {
                endpoint: endpoint.into(),
                header: header.into(),
            },
            client_id,
        )
    }

    fn new(endpoint: IdentityEndpoint, client_id: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(IMDS_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            client_id,
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &str {
        "ManagedIdentityCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = scope_to_resource(scope);

        let request = match &self.endpoint {
            IdentityEndpoint::AppService { endpoint, header } => self
                .client
                .get(endpoint)
                .header("X-IDENTITY-HEADER", header)
                .query(&[("api-version", APP_SERVICE_API_VERSION), ("resource", resource)]),
            IdentityEndpoint::Imds { endpoint } => self
                .client
                .get(endpoint)
                .header("Metadata", "true")
                .query(&[("api-version", IMDS_API_VERSION), ("resource", resource)]),
        };
        let request = match &self.client_id {
            Some(client_id) => request.query(&[("client_id", client_id)]),
            None => request,
        };

        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let err_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Managed identity endpoint returned {}: {}",
                status,
                err_text
            ));
        }

        let token_response: Value = resp.json().await?;
        token_from_response(&token_response)
    }
}
