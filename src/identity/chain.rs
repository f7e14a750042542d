//! Default credential chain

use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::identity::{
    AzureCliCredential, CredentialSource, EnvironmentCredential, ManagedIdentityCredential,
    WorkloadIdentityCredential,
};
use crate::logging::Logger;
use reqwest::Client;
use std::time::Duration;

/// Tries each source in order and returns the first token obtained
pub struct DefaultCredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
    timeout: Duration,
}

impl DefaultCredentialChain {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    /// Environment, workload identity, managed identity, Azure CLI
    pub fn from_config(config: &HelperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HelperError::Credential(format!("Failed to create identity client: {}", e)))?;

        let sources: Vec<Box<dyn CredentialSource>> = vec![
            Box::new(EnvironmentCredential::new(client.clone(), config)),
            Box::new(WorkloadIdentityCredential::new(client, config)),
            Box::new(ManagedIdentityCredential::new(config)?),
            Box::new(AzureCliCredential::new(config)),
        ];

        Ok(Self::new(sources, config.timeout))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Request a token for `scope`, bounded by the chain timeout
    pub async fn get_token(&self, scope: &str, output: &Logger) -> Result<String> {
        output.detail(&format!("Credential sources: {}", self.source_names().join(", ")));
        match tokio::time::timeout(self.timeout, self.try_sources(scope, output)).await {
            Ok(result) => result,
            Err(_) => Err(HelperError::Timeout(format!(
                "timed out after {}s waiting for an access token",
                self.timeout.as_secs()
            ))),
        }
    }

    async fn try_sources(&self, scope: &str, output: &Logger) -> Result<String> {
        if self.sources.is_empty() {
            return Err(HelperError::Credential("no credential sources configured".to_string()));
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            output.step(&format!("Trying {}", source.name()));
            match source.get_token(scope, output).await {
                Ok(token) => {
                    output.verbose(&format!(
                        "{} provided an access token (length: {} chars)",
                        source.name(),
                        token.len()
                    ));
                    return Ok(token);
                }
                Err(e @ HelperError::CredentialUnavailable(_)) => {
                    output.verbose(&format!("{} skipped: {}", source.name(), e));
                    failures.push(format!("{}: {}", source.name(), e));
                }
                Err(e) => {
                    // A configured source that fails to authenticate ends the chain
                    output.verbose(&format!("{} failed: {}", source.name(), e));
                    failures.push(format!("{}: {}", source.name(), e));
                    return Err(HelperError::Credential(format!(
                        "{} authentication failed ({})",
                        source.name(),
                        failures.join("; ")
                    )));
                }
            }
        }

        Err(HelperError::Credential(format!(
            "no credential source succeeded ({})",
            failures.join("; ")
        )))
    }
}
