//! Azure AD identity sources
//!
//! This module resolves an access token for the ACR resource through a
//! default-credential chain: environment service principal, workload identity,
//! managed identity and finally an Azure CLI login session.

pub mod azure_cli;
pub mod chain;
pub mod environment;
pub mod managed;
pub mod workload;

pub use azure_cli::AzureCliCredential;
pub use chain::DefaultCredentialChain;
pub use environment::EnvironmentCredential;
pub use managed::ManagedIdentityCredential;
pub use workload::WorkloadIdentityCredential;

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{HelperError, Result};
use crate::logging::Logger;
use async_trait::async_trait;
use serde::Deserialize;

/// Scope requested for every ACR access token
pub const ACR_SCOPE: &str = "https://containerregistry.azure.net/.default";

/// One way of obtaining an access token
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Name used in diagnostics and aggregated errors
    fn name(&self) -> &'static str;

    /// Request a token for `scope`
    async fn get_token(&self, scope: &str, output: &Logger) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Resource form of a `.default` scope, as managed identity endpoints expect it
pub fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

/// Azure AD v2 token endpoint of a tenant
pub(crate) fn token_endpoint(authority_host: &str, tenant_id: &str) -> String {
    format!("{}/{}/oauth2/v2.0/token", authority_host.trim_end_matches('/'), tenant_id)
}

pub(crate) fn unavailable(reason: &str) -> HelperError {
    HelperError::CredentialUnavailable(reason.to_string())
}

/// Send a token request and pull `access_token` out of the JSON answer
pub(crate) async fn send_token_request(request: reqwest::RequestBuilder, context: &str) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| HelperError::Credential(NetworkErrorHandler::describe(&e, context)))?;

    read_token_response(response, context).await
}

/// Pull `access_token` out of a token endpoint answer
pub(crate) async fn read_token_response(response: reqwest::Response, context: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        return Err(HttpErrorHandler::handle_identity_error(status, &body));
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| HelperError::Credential(format!("failed to parse {} response: {}", context, e)))?;

    parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HelperError::Credential(format!("{} response contained no access_token", context)))
}
