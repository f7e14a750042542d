//! Error types and handlers for credential helper operations
//!
//! Every failure that reaches the credential-helper protocol is a
//! [`HelperError`]. Its `Display` output is the exact text written to stdout,
//! so the messages carry the remediation hints a user needs.

pub mod handlers;

use crate::registry::{REGISTRY_DOMAIN_SUFFIX, REGISTRY_NAME_RULE};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HelperError>;

#[derive(Debug, Error)]
pub enum HelperError {
    /// Registry reference was empty after trimming
    #[error("registry URL is empty")]
    EmptyInput,

    /// Registry reference violated a URL shape constraint
    #[error("invalid registry URL: {0}")]
    InvalidUrl(String),

    /// Host does not belong to the ACR domain
    #[error("not an ACR registry: URL must end with {suffix}, got: {host}", suffix = REGISTRY_DOMAIN_SUFFIX)]
    NotRegistryDomain { host: String },

    /// Registry short name failed the name rule
    #[error("invalid ACR registry name: must be {rule}, got: {name}", rule = REGISTRY_NAME_RULE)]
    InvalidRegistryName { name: String },

    /// Identity chain could not produce an access token
    #[error(
        "Azure authentication failed: {0}. Ensure credentials are available from one of: \
         environment variables (AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET), \
         workload identity (AZURE_FEDERATED_TOKEN_FILE), managed identity, \
         or an Azure CLI login (az login)."
    )]
    AuthFailed(#[source] Box<HelperError>),

    /// Neither the token nor the configuration supplied a tenant
    #[error(
        "Unable to determine tenant ID: not found in access token and \
         AZURE_TENANT_ID environment variable is not set. \
         Please set AZURE_TENANT_ID to your Azure tenant ID."
    )]
    MissingTenantId,

    /// Registry token exchange failed
    #[error(
        "ACR token exchange failed: {0}. Verify that AZURE_TENANT_ID is correct \
         and that you have permission to access the registry."
    )]
    ExchangeFailed(#[source] Box<HelperError>),

    /// Operation deliberately not offered by this helper
    #[error(
        "operation '{0}' is not supported by docker-credential-acr. \
         This helper only supports credential retrieval (get)."
    )]
    NotSupported(String),

    /// Credential source failure inside the identity chain
    #[error("{0}")]
    Credential(String),

    /// Credential source not configured in this environment, the chain
    /// moves on to the next one
    #[error("unavailable: {0}")]
    CredentialUnavailable(String),

    /// Token claims could not be read
    #[error("{0}")]
    Claims(String),

    /// Exchange endpoint failure before wrapping
    #[error("{0}")]
    Exchange(String),

    /// Malformed protocol input
    #[error("{0}")]
    Protocol(String),

    /// Timed out waiting on a network or process operation
    #[error("{0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HelperError {
    /// Wrap an identity chain failure with the authentication guidance
    pub fn auth_failed(cause: HelperError) -> Self {
        HelperError::AuthFailed(Box::new(cause))
    }

    /// Wrap an exchange failure with the tenant/permission guidance
    pub fn exchange_failed(cause: HelperError) -> Self {
        HelperError::ExchangeFailed(Box::new(cause))
    }

    /// True for failures produced while validating the registry reference
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            HelperError::EmptyInput
                | HelperError::InvalidUrl(_)
                | HelperError::NotRegistryDomain { .. }
                | HelperError::InvalidRegistryName { .. }
        )
    }
}

impl From<reqwest::Error> for HelperError {
    fn from(err: reqwest::Error) -> Self {
        handlers::NetworkErrorHandler::handle_network_error(&err, "request")
    }
}

impl From<url::ParseError> for HelperError {
    fn from(err: url::ParseError) -> Self {
        HelperError::InvalidUrl(err.to_string())
    }
}
