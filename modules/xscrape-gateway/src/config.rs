use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::request::DEFAULT_LIMIT;
use crate::transport::ProxyConfig;

// Callers give up after 60s; a timeout must reach them as a JSON error first.
const DEFAULT_TIMEOUT_SECS: u64 = 55;
const DEFAULT_MAX_LIMIT: usize = 200;

/// Gateway configuration loaded once from environment variables.
///
/// Immutable after startup and shared read-only by every request.
#[derive(Clone)]
pub struct Config {
    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Egress
    pub proxy: Option<ProxyConfig>,

    // Service-account credentials, used only when a request omits its own
    pub fallback_auth_token: Option<String>,
    pub fallback_csrf_token: Option<String>,

    // Limits
    pub request_timeout: Duration,
    pub max_limit: usize,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_vars(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let web_port = match var("WEB_PORT") {
            Some(raw) => raw.parse().context("WEB_PORT must be a port number")?,
            None => 3000,
        };
        let proxy = var("TWITTER_PROXY_URL")
            .map(|raw| ProxyConfig::parse(&raw))
            .transpose()
            .context("TWITTER_PROXY_URL is invalid")?;
        let timeout_secs: u64 = match var("SCRAPE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .context("SCRAPE_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("SCRAPE_TIMEOUT_SECS must be greater than zero");
        }
        let max_limit: usize = match var("SCRAPE_MAX_LIMIT") {
            Some(raw) => raw
                .parse()
                .context("SCRAPE_MAX_LIMIT must be a positive integer")?,
            None => DEFAULT_MAX_LIMIT,
        };
        if max_limit < DEFAULT_LIMIT {
            bail!("SCRAPE_MAX_LIMIT must be at least {DEFAULT_LIMIT}");
        }

        Ok(Self {
            web_host: var("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
            proxy,
            fallback_auth_token: var("TWITTER_AUTH_TOKEN"),
            fallback_csrf_token: var("TWITTER_CT0"),
            request_timeout: Duration::from_secs(timeout_secs),
            max_limit,
        })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  WEB: {}:{}", self.web_host, self.web_port);
        tracing::info!(
            "  TWITTER_PROXY_URL: {}",
            self.proxy
                .as_ref()
                .map(ProxyConfig::redacted)
                .unwrap_or_else(|| "<not set>".to_string())
        );
        tracing::info!("  TWITTER_AUTH_TOKEN: {}", preview_opt(&self.fallback_auth_token));
        tracing::info!("  TWITTER_CT0: {}", preview_opt(&self.fallback_csrf_token));
        tracing::info!("  SCRAPE_TIMEOUT_SECS: {}", self.request_timeout.as_secs());
        tracing::info!("  SCRAPE_MAX_LIMIT: {}", self.max_limit);
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("web_host", &self.web_host)
            .field("web_port", &self.web_port)
            .field("proxy", &self.proxy.as_ref().map(ProxyConfig::redacted))
            .field("fallback_auth_token", &preview_opt(&self.fallback_auth_token))
            .field("fallback_csrf_token", &preview_opt(&self.fallback_csrf_token))
            .field("request_timeout", &self.request_timeout)
            .field("max_limit", &self.max_limit)
            .finish()
    }
}

/// Short non-secret prefix of a credential, e.g. `a1b2c...(40 chars)`.
pub(crate) fn preview(val: &str) -> String {
    let len = val.chars().count();
    let n = (len / 3).min(5);
    let prefix: String = val.chars().take(n).collect();
    format!("{prefix}...({len} chars)")
}

pub(crate) fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => preview(v),
        _ => "<not set>".to_string(),
    }
}
