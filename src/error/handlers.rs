//! Standardized error handling for HTTP and network failures

use crate::error::HelperError;
use reqwest::StatusCode;

/// Standard error handler for HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Handle a non-200 answer from the registry exchange endpoint.
    ///
    /// The numeric status and the raw body are always embedded; common
    /// statuses get a short hint in front.
    pub fn handle_exchange_error(status: StatusCode, body: &str) -> HelperError {
        let hint = match status.as_u16() {
            400 => "bad exchange request, the tenant may not match the token",
            401 => "access token rejected by the registry",
            403 => "identity lacks permission on the registry",
            404 => "registry or exchange endpoint not found",
            429 => "rate limited by the registry",
            500 => "registry server error",
            502 | 503 | 504 => "registry unavailable",
            _ => "unexpected response",
        };

        HelperError::Exchange(format!(
            "exchange endpoint returned status {} ({}): {}",
            status.as_u16(),
            hint,
            body
        ))
    }

    /// Handle a non-success answer from an identity token endpoint
    pub fn handle_identity_error(status: StatusCode, body: &str) -> HelperError {
        let hint = match status.as_u16() {
            400 => "invalid token request parameters",
            401 => "invalid client credentials",
            403 => "access denied",
            404 => "token endpoint not found",
            _ => "unexpected response",
        };

        HelperError::Credential(format!(
            "token request failed with status {} ({}): {}",
            status.as_u16(),
            hint,
            body
        ))
    }
}

/// Network error categorization and handling
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    /// Categorize and format network errors with helpful context
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> HelperError {
        let message = Self::describe(error, context);
        if error.is_timeout() {
            HelperError::Timeout(message)
        } else {
            HelperError::Exchange(message)
        }
    }

    /// Human-readable description of a transport failure
    pub fn describe(error: &reqwest::Error, context: &str) -> String {
        if error.is_timeout() {
            format!("{} timed out: {}", context, error)
        } else if error.is_connect() {
            format!("connection error during {}: {}", context, error)
        } else if error.is_decode() {
            format!("failed to decode {} response: {}", context, error)
        } else if error.to_string().contains("certificate") {
            format!("TLS certificate error during {}: {}", context, error)
        } else {
            format!("{} failed: {}", context, error)
        }
    }
}
