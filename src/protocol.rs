//! Docker credential-helper protocol
//!
//! One action per process: the action name arrives as the only argument, the
//! payload on stdin, and the JSON result (or the error text) goes to stdout.

use crate::broker::TokenBroker;
use crate::error::{HelperError, Result};
use crate::helper::{AcrHelper, Credentials};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::str::FromStr;

pub const PROGRAM_NAME: &str = "docker-credential-acr";

/// The operations a credential helper offers to the container engine
#[async_trait]
pub trait CredentialHelper: Send + Sync {
    async fn get(&self, server_url: &str) -> Result<Credentials>;
    async fn store(&self, credentials: &Credentials) -> Result<()>;
    async fn erase(&self, server_url: &str) -> Result<()>;
    async fn list(&self) -> Result<HashMap<String, String>>;
}

#[async_trait]
impl<B: TokenBroker> CredentialHelper for AcrHelper<B> {
    async fn get(&self, server_url: &str) -> Result<Credentials> {
        AcrHelper::get(self, server_url).await
    }

    async fn store(&self, credentials: &Credentials) -> Result<()> {
        AcrHelper::store(self, credentials)
    }

    async fn erase(&self, server_url: &str) -> Result<()> {
        AcrHelper::erase(self, server_url)
    }

    async fn list(&self) -> Result<HashMap<String, String>> {
        AcrHelper::list(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Get,
    Store,
    Erase,
    List,
    Version,
    Help,
}

impl FromStr for Action {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Action::Get),
            "store" => Ok(Action::Store),
            "erase" => Ok(Action::Erase),
            "list" => Ok(Action::List),
            "version" | "-v" | "--version" => Ok(Action::Version),
            "-h" | "--help" => Ok(Action::Help),
            other => Err(HelperError::Protocol(format!("unknown action: {}", other))),
        }
    }
}

pub fn usage() -> String {
    format!("Usage: {} <store|get|erase|list|version>", PROGRAM_NAME)
}

pub fn version_line() -> String {
    format!(
        "{} ({}) {}",
        PROGRAM_NAME,
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Run one action against `helper`, reading its payload from `input` and
/// writing the successful result to `out`
pub async fn handle_command<H, R, W>(helper: &H, action: Action, input: &mut R, out: &mut W) -> Result<()>
where
    H: CredentialHelper + ?Sized,
    R: Read,
    W: Write,
{
    match action {
        Action::Get => {
            let server_url = read_payload(input)?;
            let credentials = helper.get(server_url.trim()).await?;
            serde_json::to_writer(&mut *out, &credentials)?;
            writeln!(out)?;
        }
        Action::Store => {
            let payload = read_payload(input)?;
            // The helper rejects store whatever the payload holds
            let credentials = serde_json::from_str::<Credentials>(&payload).unwrap_or_default();
            helper.store(&credentials).await?;
        }
        Action::Erase => {
            let server_url = read_payload(input)?;
            helper.erase(server_url.trim()).await?;
        }
        Action::List => {
            let listing = helper.list().await?;
            serde_json::to_writer(&mut *out, &listing)?;
            writeln!(out)?;
        }
        Action::Version => writeln!(out, "{}", version_line())?,
        Action::Help => writeln!(out, "{}", usage())?,
    }

    out.flush()?;
    Ok(())
}

fn read_payload<R: Read>(input: &mut R) -> Result<String> {
    let mut payload = String::new();
    input.read_to_string(&mut payload)?;
    Ok(payload)
}
