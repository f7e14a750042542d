//! ACR token exchange
//!
//! Trades an Azure AD access token for a registry-scoped refresh token via
//! `POST https://<registry>/oauth2/exchange`.

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{HelperError, Result};
use crate::logging::Logger;
use crate::registry::TOKEN_EXCHANGE_PATH;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    refresh_token: Option<String>,
}

/// Inputs of one exchange call
#[derive(Debug, Clone, Copy)]
pub struct ExchangeRequest<'a> {
    pub registry_host: &'a str,
    pub tenant_id: &'a str,
    pub access_token: &'a str,
}

impl<'a> ExchangeRequest<'a> {
    pub fn new(registry_host: &'a str, tenant_id: &'a str, access_token: &'a str) -> Self {
        Self {
            registry_host,
            tenant_id,
            access_token,
        }
    }

    fn form(&self) -> [(&'static str, &'a str); 4] {
        [
            ("grant_type", "access_token"),
            ("service", self.registry_host),
            ("tenant", self.tenant_id),
            ("access_token", self.access_token),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Auth {
    client: Client,
    /// Replaces `https://<registry>` as the exchange base, used against
    /// local mock registries
    endpoint_override: Option<String>,
}

impl Auth {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HelperError::Exchange(format!("Failed to create exchange client: {}", e)))?;

        Ok(Self {
            client,
            endpoint_override: None,
        })
    }

    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        self.endpoint_override = endpoint.map(|e| e.trim_end_matches('/').to_string());
        self
    }

    /// Exchange endpoint URL for a registry host
    pub fn exchange_url(&self, registry_host: &str) -> String {
        match &self.endpoint_override {
            Some(base) => format!("{}{}", base, TOKEN_EXCHANGE_PATH),
            None => format!("https://{}{}", registry_host, TOKEN_EXCHANGE_PATH),
        }
    }

    /// Perform the exchange and return the refresh token
    pub async fn exchange(&self, request: ExchangeRequest<'_>, output: &Logger) -> Result<String> {
        let url = self.exchange_url(request.registry_host);
        output.detail(&format!("Requesting refresh token from: {}", url));

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(&request.form())
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, "token exchange"))?;

        let status = response.status();
        output.detail(&format!("Exchange response status: {}", status));

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(HttpErrorHandler::handle_exchange_error(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, "token exchange"))?;
        let parsed: ExchangeResponse = serde_json::from_str(&body)
            .map_err(|e| HelperError::Exchange(format!("failed to parse ACR token response: {}", e)))?;

        match parsed.refresh_token {
            Some(token) if !token.is_empty() => {
                output.detail(&format!("Refresh token obtained (length: {} chars)", token.len()));
                Ok(token)
            }
            _ => Err(HelperError::Exchange(
                "ACR token exchange returned empty refresh_token".to_string(),
            )),
        }
    }
}
