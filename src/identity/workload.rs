//! Federated workload identity (Kubernetes service account tokens)

use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::identity::{CredentialSource, send_token_request, token_endpoint, unavailable};
use crate::logging::Logger;
use async_trait::async_trait;
use reqwest::Client;

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

#[derive(Debug, Clone)]
pub struct WorkloadIdentityCredential {
    client: Client,
    authority_host: String,
    tenant_id: Option<String>,
    client_id: Option<String>,
    token_file: Option<String>,
}

impl WorkloadIdentityCredential {
    pub fn new(client: Client, config: &HelperConfig) -> Self {
        Self {
            client,
            authority_host: config.authority_host.clone(),
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            token_file: config.federated_token_file.clone(),
        }
    }
}

#[async_trait]
impl CredentialSource for WorkloadIdentityCredential {
    fn name(&self) -> &'static str {
        "WorkloadIdentityCredential"
    }

    async fn get_token(&self, scope: &str, output: &Logger) -> Result<String> {
        let (Some(tenant_id), Some(client_id), Some(token_file)) =
            (&self.tenant_id, &self.client_id, &self.token_file)
        else {
            return Err(unavailable(
                "AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_FEDERATED_TOKEN_FILE are not all set",
            ));
        };

        // Re-read on every call, the projected token is rotated by the kubelet
        let assertion = tokio::fs::read_to_string(token_file).await.map_err(|e| {
            HelperError::Credential(format!("failed to read federated token file {}: {}", token_file, e))
        })?;
        let assertion = assertion.trim();
        if assertion.is_empty() {
            return Err(HelperError::Credential(format!(
                "federated token file {} is empty",
                token_file
            )));
        }

        let url = token_endpoint(&self.authority_host, tenant_id);
        output.detail(&format!("Requesting federated token from: {}", url));

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion),
            ("scope", scope),
        ];

        send_token_request(self.client.post(&url).form(&form), "federated token request").await
    }
}
