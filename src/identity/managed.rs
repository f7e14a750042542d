//! Managed identity via App Service identity endpoint or IMDS

use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::error::handlers::NetworkErrorHandler;
use crate::identity::{CredentialSource, read_token_response, scope_to_resource, send_token_request, unavailable};
use crate::logging::Logger;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const IMDS_TOKEN_PATH: &str = "/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Off Azure nothing answers on the IMDS address, so connecting must fail fast
const IMDS_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ManagedIdentityCredential {
    client: Client,
    client_id: Option<String>,
    identity_endpoint: Option<String>,
    identity_header: Option<String>,
    imds_endpoint: String,
}

impl ManagedIdentityCredential {
    pub fn new(config: &HelperConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(IMDS_CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| HelperError::Credential(format!("Failed to create managed identity client: {}", e)))?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            identity_endpoint: config.identity_endpoint.clone(),
            identity_header: config.identity_header.clone(),
            imds_endpoint: config.imds_endpoint.clone(),
        })
    }

    fn query<'a>(&'a self, api_version: &'a str, resource: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("api-version", api_version), ("resource", resource)];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }
        query
    }
}

#[async_trait]
impl CredentialSource for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        "ManagedIdentityCredential"
    }

    async fn get_token(&self, scope: &str, output: &Logger) -> Result<String> {
        let resource = scope_to_resource(scope);

        if let (Some(endpoint), Some(header)) = (&self.identity_endpoint, &self.identity_header) {
            output.detail(&format!("Requesting managed identity token from: {}", endpoint));
            let request = self
                .client
                .get(endpoint)
                .query(&self.query(APP_SERVICE_API_VERSION, resource))
                .header("X-IDENTITY-HEADER", header);
            return send_token_request(request, "managed identity token request").await;
        }

        let url = format!("{}{}", self.imds_endpoint.trim_end_matches('/'), IMDS_TOKEN_PATH);
        output.detail(&format!("Requesting managed identity token from IMDS: {}", url));
        let response = self
            .client
            .get(&url)
            .query(&self.query(IMDS_API_VERSION, resource))
            .header("Metadata", "true")
            .send()
            .await;

        // No IMDS answering, or IMDS without an identity, means this host has
        // no managed identity rather than a broken one
        let response = match response {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(unavailable(&NetworkErrorHandler::describe(&e, "IMDS token request")));
            }
            Err(e) => {
                return Err(HelperError::Credential(NetworkErrorHandler::describe(
                    &e,
                    "IMDS token request",
                )));
            }
        };

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(unavailable(&format!("no managed identity assigned: {}", body)));
        }

        read_token_response(response, "IMDS token request").await
    }
}
