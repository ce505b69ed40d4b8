use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tokio::process::Command;

use super::{scope_to_resource, AccessToken, TokenCredential};

/// Reuses the token of the developer's `az login` session
pub struct AzureCliCredential {
    program: String,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: "az".to_string(),
        }
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &str {
        "AzureCliCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let output = Command::new(&self.program)
            .args([
                "account",
                "get-access-token",
                "--output",
                "json",
                "--resource",
                scope_to_resource(scope),
            ])
            .output()
            .await
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Azure CLI returned an error: {}", stderr.trim()));
        }

        let response: Value = serde_json::from_slice(&output.stdout)
            .context("Azure CLI produced output that is not JSON")?;
        parse_cli_token(&response)
    }
}

/// Newer CLI versions report `expires_on` as a unix timestamp; older ones only
/// have `expiresOn` as a local time string.
fn parse_cli_token(response: &Value) -> Result<AccessToken> {
    let token = response
        .get("accessToken")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("accessToken not found in Azure CLI output"))?;

    let expires_at = response
        .get("expires_on")
        .and_then(|v| v.as_i64())
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .or_else(|| {
            let raw = response.get("expiresOn")?.as_str()?;
            let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()?;
            Local
                .from_local_datetime(&naive)
                .single()
                .map(|local| local.with_timezone(&Utc))
        })
        .unwrap_or_else(|| Utc::now() + Duration::hours(1));

    Ok(AccessToken::new(token, expires_at))
}
