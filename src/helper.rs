//! ACR credential helper operations
//!
//! [`AcrHelper`] runs validate -> acquire -> resolve tenant -> exchange for
//! `get` and rejects everything that would store or remove credentials.

use crate::broker::TokenBroker;
use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::logging::Logger;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Credentials in the docker credential-helper wire format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "ServerURL", default)]
    pub server_url: String,
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "Secret", default)]
    pub secret: String,
}

/// Username ACR expects alongside a refresh token: the nil GUID
pub fn refresh_token_username() -> String {
    Uuid::nil().hyphenated().to_string()
}

pub struct AcrHelper<B> {
    broker: B,
    tenant_fallback: Option<String>,
    output: Logger,
}

impl<B: TokenBroker> AcrHelper<B> {
    pub fn new(broker: B, config: &HelperConfig) -> Self {
        Self {
            broker,
            tenant_fallback: config.tenant_fallback().map(str::to_string),
            output: Logger::new_quiet(),
        }
    }

    pub fn with_output(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Retrieve credentials using the configured tenant fallback
    pub async fn get(&self, server_url: &str) -> Result<Credentials> {
        self.get_with_tenant(server_url, self.tenant_fallback.as_deref()).await
    }

    /// Retrieve credentials for `server_url`, falling back to
    /// `tenant_fallback` when the token carries no usable tenant
    pub async fn get_with_tenant(&self, server_url: &str, tenant_fallback: Option<&str>) -> Result<Credentials> {
        let registry = registry::normalize(server_url)?;
        self.output.step(&format!("Registry: {} (name: {})", registry, registry.name));

        let access_token = self
            .broker
            .acquire_access_token()
            .await
            .map_err(HelperError::auth_failed)?;

        let tenant_id = match self.broker.resolve_tenant(&access_token) {
            Ok(tid) if !tid.is_empty() => {
                self.output.detail("Tenant taken from access token");
                tid
            }
            result => {
                if let Err(e) = result {
                    self.output.verbose(&format!("Tenant not readable from token: {}", e));
                }
                match tenant_fallback.filter(|t| !t.is_empty()) {
                    Some(tid) => {
                        self.output.detail("Tenant taken from AZURE_TENANT_ID");
                        tid.to_string()
                    }
                    None => return Err(HelperError::MissingTenantId),
                }
            }
        };

        let refresh_token = self
            .broker
            .exchange_token(&registry.host, &tenant_id, &access_token)
            .await
            .map_err(HelperError::exchange_failed)?;

        self.output.success(&format!("Obtained refresh token for {}", registry));

        Ok(Credentials {
            server_url: server_url.to_string(),
            username: refresh_token_username(),
            secret: refresh_token,
        })
    }

    pub fn store(&self, _credentials: &Credentials) -> Result<()> {
        Err(HelperError::NotSupported("store".to_string()))
    }

    pub fn erase(&self, _server_url: &str) -> Result<()> {
        Err(HelperError::NotSupported("erase".to_string()))
    }

    /// No credentials are ever stored, so the listing is always empty
    pub fn list(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}
