//! Docker credential helper for Azure Container Registry
//!
//! This crate validates ACR registry references, acquires an Azure AD access
//! token through a default-credential chain and exchanges it for a
//! registry refresh token, served over the docker credential-helper protocol.

pub mod broker;
pub mod cli;
pub mod config;
pub mod error;
pub mod helper;
pub mod identity;
pub mod logging;
pub mod protocol;
pub mod registry;

pub use broker::{AzureTokenBroker, LazyAzureTokenBroker, TokenBroker};
pub use config::HelperConfig;
pub use error::{HelperError, Result};
pub use helper::{AcrHelper, Credentials};
pub use logging::Logger;
pub use registry::{CanonicalRegistry, is_registry, normalize};
