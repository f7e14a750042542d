//! Service principal credentials from environment variables

use crate::config::HelperConfig;
use crate::error::Result;
use crate::identity::{CredentialSource, send_token_request, token_endpoint, unavailable};
use crate::logging::Logger;
use async_trait::async_trait;
use reqwest::Client;

/// Client-secret flow driven by `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
/// `AZURE_CLIENT_SECRET`
#[derive(Debug, Clone)]
pub struct EnvironmentCredential {
    client: Client,
    authority_host: String,
    tenant_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl EnvironmentCredential {
    pub fn new(client: Client, config: &HelperConfig) -> Self {
        Self {
            client,
            authority_host: config.authority_host.clone(),
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl CredentialSource for EnvironmentCredential {
    fn name(&self) -> &'static str {
        "EnvironmentCredential"
    }

    async fn get_token(&self, scope: &str, output: &Logger) -> Result<String> {
        let (Some(tenant_id), Some(client_id), Some(client_secret)) =
            (&self.tenant_id, &self.client_id, &self.client_secret)
        else {
            return Err(unavailable(
                "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET are not all set",
            ));
        };

        let url = token_endpoint(&self.authority_host, tenant_id);
        output.detail(&format!("Requesting client credentials token from: {}", url));

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("scope", scope),
        ];

        send_token_request(self.client.post(&url).form(&form), "client credentials token request").await
    }
}
