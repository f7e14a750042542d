//! Registry module for Azure Container Registry interactions
//!
//! This module validates registry references and performs the ACR token
//! exchange that turns an Azure AD access token into a registry refresh token.

pub mod auth;
pub mod validator;

pub use auth::{Auth, ExchangeRequest};
pub use validator::{CanonicalRegistry, is_registry, normalize};

/// Domain every ACR registry host ends with
pub const REGISTRY_DOMAIN_SUFFIX: &str = ".azurecr.io";

pub const REGISTRY_NAME_MIN_LEN: usize = 5;
pub const REGISTRY_NAME_MAX_LEN: usize = 50;

/// Human-readable form of the registry name rule, used in error messages
pub const REGISTRY_NAME_RULE: &str = "5-50 lowercase alphanumeric characters";

/// Path of the token exchange endpoint on every registry
pub const TOKEN_EXCHANGE_PATH: &str = "/oauth2/exchange";
