//! Registry reference validation
//!
//! Turns user-supplied registry references (bare hosts or URLs) into a
//! [`CanonicalRegistry`]. Anything that could make the later exchange request
//! reach a different host than the one validated here is rejected: ports,
//! paths, queries, fragments and user info.

use crate::error::{HelperError, Result};
use crate::registry::{REGISTRY_DOMAIN_SUFFIX, REGISTRY_NAME_MAX_LEN, REGISTRY_NAME_MIN_LEN};
use url::Url;

/// Validated registry host and its short name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRegistry {
    /// Lower-case host, always ending with the ACR domain suffix
    pub host: String,
    /// Host without the suffix
    pub name: String,
}

impl std::fmt::Display for CanonicalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.host)
    }
}

/// Validate a registry reference and return its canonical form
pub fn normalize(input: &str) -> Result<CanonicalRegistry> {
    let raw = input.trim().to_lowercase();
    if raw.is_empty() {
        return Err(HelperError::EmptyInput);
    }

    let host = if raw.contains("://") {
        host_from_url(&raw)?
    } else {
        host_from_bare(&raw)?
    };

    let name = match host.strip_suffix(REGISTRY_DOMAIN_SUFFIX) {
        Some(name) => name.to_string(),
        None => return Err(HelperError::NotRegistryDomain { host }),
    };

    if !is_valid_registry_name(&name) {
        return Err(HelperError::InvalidRegistryName { name });
    }

    Ok(CanonicalRegistry { host, name })
}

/// True only when `input` fully normalizes to an ACR registry
pub fn is_registry(input: &str) -> bool {
    normalize(input).is_ok()
}

/// Short names are lower-case alphanumeric, 5 to 50 characters
pub fn is_valid_registry_name(name: &str) -> bool {
    (REGISTRY_NAME_MIN_LEN..=REGISTRY_NAME_MAX_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn host_from_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)?;
    let authority = raw_authority(raw);

    let host = parsed.host_str().unwrap_or_default();
    if host.is_empty() {
        return Err(invalid("missing host"));
    }

    // Url drops default ports (https://host:443), so check the raw authority too
    if parsed.port().is_some() || has_explicit_port(authority) {
        return Err(invalid("ports are not allowed"));
    }

    if !matches!(parsed.path(), "" | "/") {
        return Err(invalid("paths are not allowed"));
    }

    if parsed.query().is_some()
        || parsed.fragment().is_some()
        || !parsed.username().is_empty()
        || parsed.password().is_some()
        || authority.contains('@')
    {
        return Err(invalid("query, fragment, and user info are not allowed"));
    }

    Ok(host.strip_suffix('.').unwrap_or(host).to_string())
}

fn host_from_bare(raw: &str) -> Result<String> {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);

    if trimmed.contains(|c| matches!(c, '/' | '?' | '#')) {
        return Err(invalid("paths, query, and fragment are not allowed"));
    }
    if trimmed.contains(':') {
        return Err(invalid("ports are not allowed"));
    }
    if trimmed.contains('@') {
        return Err(invalid("user info is not allowed"));
    }

    Ok(trimmed.strip_suffix('.').unwrap_or(trimmed).to_string())
}

/// The `userinfo@host:port` part of a URL string
fn raw_authority(raw: &str) -> &str {
    let rest = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
    let end = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    &rest[..end]
}

fn has_explicit_port(authority: &str) -> bool {
    let host_port = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);

    match host_port.strip_prefix('[') {
        Some(rest) => rest
            .split_once(']')
            .is_some_and(|(_, after)| after.starts_with(':')),
        None => host_port.contains(':'),
    }
}

fn invalid(reason: &str) -> HelperError {
    HelperError::InvalidUrl(reason.to_string())
}
