use std::fmt;

use serde::Deserialize;
use tracing::info;

use crate::config::{preview, Config};
use crate::error::GatewayError;

/// Posts returned when the caller does not ask for a number.
pub const DEFAULT_LIMIT: usize = 20;

/// Inbound `POST /scrape` body, as sent.
#[derive(Default, Deserialize)]
pub struct ScrapeBody {
    pub username: Option<String>,
    pub limit: Option<i64>,
    pub auth_token: Option<String>,
    pub ct0: Option<String>,
}

/// Where a session token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Request,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Request => f.write_str("request"),
            CredentialSource::Environment => f.write_str("environment"),
        }
    }
}

/// The two session tokens for one request. Never persisted, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    auth_token: String,
    csrf_token: String,
}

impl SessionCredentials {
    pub fn new(auth_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            csrf_token: csrf_token.into(),
        }
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("auth_token", &preview(&self.auth_token))
            .field("csrf_token", &preview(&self.csrf_token))
            .finish()
    }
}

/// A validated, normalized scrape request.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub account_name: String,
    pub limit: usize,
    pub credentials: SessionCredentials,
}

/// Normalize the body and resolve credential fallbacks.
///
/// Fails before anything touches the network when the account name or either
/// token is still empty after falling back to the configured defaults.
pub fn validate(body: ScrapeBody, config: &Config) -> Result<ScrapeRequest, GatewayError> {
    let account_name = body
        .username
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let auth = resolve_token(body.auth_token, config.fallback_auth_token.as_deref());
    let csrf = resolve_token(body.ct0, config.fallback_csrf_token.as_deref());

    info!(
        account = %account_name,
        auth_token = %describe(&auth),
        ct0 = %describe(&csrf),
        "Resolved scrape credentials"
    );

    let (Some((auth_token, _)), Some((csrf_token, _))) = (auth, csrf) else {
        return Err(GatewayError::missing_fields());
    };
    if account_name.is_empty() {
        return Err(GatewayError::missing_fields());
    }

    let limit = resolve_limit(body.limit, config.max_limit)?;

    if !is_cookie_safe(&auth_token) || !is_cookie_safe(&csrf_token) {
        return Err(GatewayError::Validation(
            "session credentials contain invalid characters".to_string(),
        ));
    }

    Ok(ScrapeRequest {
        account_name,
        limit,
        credentials: SessionCredentials::new(auth_token, csrf_token),
    })
}

fn resolve_token(
    supplied: Option<String>,
    fallback: Option<&str>,
) -> Option<(String, CredentialSource)> {
    let supplied = supplied
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    match supplied {
        Some(token) => Some((token, CredentialSource::Request)),
        None => fallback
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| (t.to_string(), CredentialSource::Environment)),
    }
}

fn resolve_limit(requested: Option<i64>, max_limit: usize) -> Result<usize, GatewayError> {
    let Some(requested) = requested else {
        return Ok(DEFAULT_LIMIT);
    };
    if requested < 1 {
        return Err(GatewayError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }
    match usize::try_from(requested) {
        Ok(limit) if limit <= max_limit => Ok(limit),
        _ => Err(GatewayError::Validation(format!(
            "limit must not exceed {max_limit}"
        ))),
    }
}

fn describe(token: &Option<(String, CredentialSource)>) -> String {
    match token {
        Some((value, source)) => format!("{} from {source}", preview(value)),
        None => "<missing>".to_string(),
    }
}

/// RFC 6265 cookie-octets: visible ASCII minus `"`, `,`, `;` and `\`.
fn is_cookie_safe(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}
