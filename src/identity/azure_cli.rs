//! Access tokens from an Azure CLI login session

use crate::config::HelperConfig;
use crate::error::{HelperError, Result};
use crate::identity::{CredentialSource, unavailable};
use crate::logging::Logger;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: Option<String>,
}

/// Runs `az account get-access-token`
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
    leading_args: Vec<String>,
    tenant_id: Option<String>,
}

impl AzureCliCredential {
    pub fn new(config: &HelperConfig) -> Self {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        Self {
            program: program.to_string(),
            leading_args: Vec::new(),
            tenant_id: config.tenant_id.clone(),
        }
    }

    /// Replace the `az` executable, e.g. with a wrapper script
    pub fn with_command(mut self, program: impl Into<String>, leading_args: Vec<String>) -> Self {
        self.program = program.into();
        self.leading_args = leading_args;
        self
    }

    fn args(&self, scope: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend(
            ["account", "get-access-token", "--output", "json", "--scope", scope]
                .iter()
                .map(|s| s.to_string()),
        );
        if let Some(tenant_id) = &self.tenant_id {
            args.push("--tenant".to_string());
            args.push(tenant_id.clone());
        }
        args
    }
}

#[async_trait]
impl CredentialSource for AzureCliCredential {
    fn name(&self) -> &'static str {
        "AzureCliCredential"
    }

    async fn get_token(&self, scope: &str, output: &Logger) -> Result<String> {
        output.detail(&format!("Running {} account get-access-token", self.program));

        let result = Command::new(&self.program)
            .args(self.args(scope))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(unavailable("Azure CLI not found on path"));
            }
            Err(e) => {
                return Err(HelperError::Credential(format!("failed to run Azure CLI: {}", e)));
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let stderr = stderr.trim();
            if stderr.contains("az login") || stderr.contains("az account set") {
                return Err(unavailable("Azure CLI is not logged in, run 'az login'"));
            }
            return Err(HelperError::Credential(format!(
                "Azure CLI exited with {}: {}",
                out.status, stderr
            )));
        }

        let parsed: CliTokenResponse = serde_json::from_slice(&out.stdout)
            .map_err(|e| HelperError::Credential(format!("failed to parse Azure CLI output: {}", e)))?;

        parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HelperError::Credential("Azure CLI returned no accessToken".to_string()))
    }
}
