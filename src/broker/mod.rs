//! Token broker
//!
//! The [`TokenBroker`] trait is the seam between the credential-helper logic
//! and Azure: acquire an access token, resolve its tenant, exchange it for a
//! registry refresh token. [`AzureTokenBroker`] is the production
//! implementation; tests inject their own.

pub mod claims;

use crate::config::HelperConfig;
use crate::error::Result;
use crate::identity::{ACR_SCOPE, CredentialSource, DefaultCredentialChain};
use crate::logging::Logger;
use crate::registry::{Auth, ExchangeRequest};
use async_trait::async_trait;
use tokio::sync::OnceCell;

#[async_trait]
pub trait TokenBroker: Send + Sync {
    /// Fresh access token for the ACR scope
    async fn acquire_access_token(&self) -> Result<String>;

    /// Tenant id carried by the token. Callers treat failure as non-fatal.
    fn resolve_tenant(&self, access_token: &str) -> Result<String> {
        claims::tenant_from_token(access_token)
    }

    /// Exchange the access token for a registry refresh token
    async fn exchange_token(&self, registry_host: &str, tenant_id: &str, access_token: &str) -> Result<String>;
}

pub struct AzureTokenBrokerBuilder {
    config: HelperConfig,
    output: Logger,
    exchange_endpoint: Option<String>,
    sources: Option<Vec<Box<dyn CredentialSource>>>,
}

impl AzureTokenBrokerBuilder {
    pub fn new(config: HelperConfig) -> Self {
        Self {
            config,
            output: Logger::new_quiet(),
            exchange_endpoint: None,
            sources: None,
        }
    }

    pub fn with_output(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    /// Send exchanges to `endpoint` instead of `https://<registry>`
    pub fn with_exchange_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.exchange_endpoint = endpoint;
        self
    }

    /// Replace the default credential sources
    pub fn with_sources(mut self, sources: Vec<Box<dyn CredentialSource>>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn build(self) -> Result<AzureTokenBroker> {
        let chain = match self.sources {
            Some(sources) => DefaultCredentialChain::new(sources, self.config.timeout),
            None => DefaultCredentialChain::from_config(&self.config)?,
        };
        let auth = Auth::new(self.config.timeout)?.with_endpoint_override(self.exchange_endpoint);

        Ok(AzureTokenBroker {
            chain,
            auth,
            output: self.output,
        })
    }
}

pub struct AzureTokenBroker {
    chain: DefaultCredentialChain,
    auth: Auth,
    output: Logger,
}

impl AzureTokenBroker {
    pub fn builder(config: HelperConfig) -> AzureTokenBrokerBuilder {
        AzureTokenBrokerBuilder::new(config)
    }
}

#[async_trait]
impl TokenBroker for AzureTokenBroker {
    async fn acquire_access_token(&self) -> Result<String> {
        self.output.verbose(&format!("Acquiring Azure access token for scope {}", ACR_SCOPE));
        self.chain.get_token(ACR_SCOPE, &self.output).await
    }

    async fn exchange_token(&self, registry_host: &str, tenant_id: &str, access_token: &str) -> Result<String> {
        self.output.verbose(&format!(
            "Exchanging access token for {} (tenant {})",
            registry_host, tenant_id
        ));
        let request = ExchangeRequest::new(registry_host, tenant_id, access_token);
        self.auth.exchange(request, &self.output).await
    }
}

/// [`AzureTokenBroker`] built on first use, so actions that never talk to
/// Azure do not depend on its HTTP clients
pub struct LazyAzureTokenBroker {
    config: HelperConfig,
    output: Logger,
    broker: OnceCell<AzureTokenBroker>,
}

impl LazyAzureTokenBroker {
    pub fn new(config: HelperConfig, output: Logger) -> Self {
        Self {
            config,
            output,
            broker: OnceCell::new(),
        }
    }

    pub fn is_built(&self) -> bool {
        self.broker.initialized()
    }

    async fn broker(&self) -> Result<&AzureTokenBroker> {
        self.broker
            .get_or_try_init(|| async {
                self.output.detail("Building Azure token broker");
                AzureTokenBroker::builder(self.config.clone())
                    .with_output(self.output.clone())
                    .build()
            })
            .await
    }
}

#[async_trait]
impl TokenBroker for LazyAzureTokenBroker {
    async fn acquire_access_token(&self) -> Result<String> {
        self.broker().await?.acquire_access_token().await
    }

    async fn exchange_token(&self, registry_host: &str, tenant_id: &str, access_token: &str) -> Result<String> {
        self.broker()
            .await?
            .exchange_token(registry_host, tenant_id, access_token)
            .await
    }
}
