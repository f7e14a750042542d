#![allow(dead_code)]

use async_trait::async_trait;
use docker_credential_acr::identity::CredentialSource;
use docker_credential_acr::{HelperError, Logger, Result, TokenBroker};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

/// JWT whose payload carries `tid`, signed with a throwaway key
pub fn jwt_with_tenant(tid: &str) -> String {
    let claims = json!({"aud": "https://containerregistry.azure.net", "tid": tid});
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"unused")).unwrap()
}

/// Credential source handing out a fixed token
pub struct StaticCredential(pub String);

#[async_trait]
impl CredentialSource for StaticCredential {
    fn name(&self) -> &'static str {
        "StaticCredential"
    }

    async fn get_token(&self, _scope: &str, _output: &Logger) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Broker with canned answers for each step
#[derive(Clone, Default)]
pub struct FakeBroker {
    pub access_token: Option<String>,
    pub tenant: Option<String>,
    pub refresh_token: Option<String>,
}

impl FakeBroker {
    pub fn succeeding() -> Self {
        Self {
            access_token: Some("tok".to_string()),
            tenant: Some("tid".to_string()),
            refresh_token: Some("rt-123".to_string()),
        }
    }
}

#[async_trait]
impl TokenBroker for FakeBroker {
    async fn acquire_access_token(&self) -> Result<String> {
        self.access_token
            .clone()
            .ok_or_else(|| HelperError::Credential("no credential providers found".to_string()))
    }

    fn resolve_tenant(&self, _access_token: &str) -> Result<String> {
        self.tenant
            .clone()
            .ok_or_else(|| HelperError::Claims("tid claim not found in token".to_string()))
    }

    async fn exchange_token(&self, _registry_host: &str, _tenant_id: &str, _access_token: &str) -> Result<String> {
        self.refresh_token
            .clone()
            .ok_or_else(|| HelperError::Exchange("exchange endpoint returned status 401".to_string()))
    }
}
