//! Configuration module for environment-driven helper settings
//!
//! The helper has no config file. Everything it needs comes from the process
//! environment, read once in `main` and handed down explicitly.

use std::env;
use std::time::Duration;

/// Timeout applied independently to token acquisition and token exchange
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254";

pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_FEDERATED_TOKEN_FILE: &str = "AZURE_FEDERATED_TOKEN_FILE";
pub const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const ENV_IDENTITY_ENDPOINT: &str = "IDENTITY_ENDPOINT";
pub const ENV_IDENTITY_HEADER: &str = "IDENTITY_HEADER";
pub const ENV_DEBUG: &str = "DOCKER_CREDENTIAL_ACR_DEBUG";

#[derive(Debug, Clone)]
pub struct HelperConfig {
    /// Tenant used when the access token carries no `tid` claim
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub federated_token_file: Option<String>,
    pub authority_host: String,
    pub identity_endpoint: Option<String>,
    pub identity_header: Option<String>,
    pub imds_endpoint: String,
    pub debug: bool,
    pub timeout: Duration,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            federated_token_file: None,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            identity_endpoint: None,
            identity_header: None,
            imds_endpoint: DEFAULT_IMDS_ENDPOINT.to_string(),
            debug: false,
            timeout: TOKEN_REQUEST_TIMEOUT,
        }
    }
}

impl HelperConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let authority_host = get(ENV_AUTHORITY_HOST)
            .map(|h| h.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());

        let debug = get(ENV_DEBUG).is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"));

        Self {
            tenant_id: get(ENV_TENANT_ID),
            client_id: get(ENV_CLIENT_ID),
            client_secret: get(ENV_CLIENT_SECRET),
            federated_token_file: get(ENV_FEDERATED_TOKEN_FILE),
            authority_host,
            identity_endpoint: get(ENV_IDENTITY_ENDPOINT),
            identity_header: get(ENV_IDENTITY_HEADER),
            imds_endpoint: DEFAULT_IMDS_ENDPOINT.to_string(),
            debug,
            timeout: TOKEN_REQUEST_TIMEOUT,
        }
    }

    pub fn with_tenant_id(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id.filter(|t| !t.is_empty());
        self
    }

    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_imds_endpoint(mut self, imds_endpoint: impl Into<String>) -> Self {
        self.imds_endpoint = imds_endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tenant fallback, if configured
    pub fn tenant_fallback(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}
