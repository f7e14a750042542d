//! Unverified JWT claim extraction
//!
//! The access token was just issued to us by Azure AD over TLS, so its claims
//! are only read, never trusted for authorization. No signature check happens
//! here.

use crate::error::{HelperError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::Value;
use std::collections::HashMap;

/// Claim carrying the Azure AD tenant
pub const TENANT_CLAIM: &str = "tid";

/// Decode a JWT's claims without verifying its signature or time claims.
///
/// Header and payload must both be valid base64url JSON; the signature
/// segment is not inspected.
pub fn parse_unverified_claims(token: &str) -> Result<HashMap<String, Value>> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let dummy_key = DecodingKey::from_secret(&[]);

    decode::<HashMap<String, Value>>(token.trim(), &dummy_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| HelperError::Claims(format!("failed to parse JWT: {}", e)))
}

/// Read the tenant id from the token's `tid` claim
pub fn tenant_from_token(token: &str) -> Result<String> {
    let claims = parse_unverified_claims(token)?;

    match claims.get(TENANT_CLAIM) {
        None => Err(HelperError::Claims("tid claim not found in token".to_string())),
        Some(Value::String(tid)) if tid.is_empty() => {
            Err(HelperError::Claims("tid claim is empty".to_string()))
        }
        Some(Value::String(tid)) => Ok(tid.clone()),
        Some(_) => Err(HelperError::Claims("tid claim is not a string".to_string())),
    }
}
