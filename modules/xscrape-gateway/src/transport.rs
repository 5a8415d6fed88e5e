use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::{ClientBuilder, Url};

use crate::error::GatewayError;

/// Bound on establishing a TCP/TLS connection, per outbound call.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Process-wide forward proxy. Parsed once at startup.
#[derive(Clone)]
pub struct ProxyConfig {
    url: Url,
}

impl ProxyConfig {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let url = Url::parse(raw).context("not a valid URL")?;
        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            bail!(
                "unsupported proxy scheme {:?} (expected one of {})",
                url.scheme(),
                SUPPORTED_SCHEMES.join(", ")
            );
        }
        if url.host_str().is_none() {
            bail!("proxy URL has no host");
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme, host and port only. Userinfo is never rendered.
    pub fn redacted(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}://{host}:{port}", self.url.scheme()),
            None => format!("{}://{host}", self.url.scheme()),
        }
    }
}

/// Outbound network configuration for one request, not yet bound to a session.
///
/// Only decides where traffic egresses. Headers are left entirely to the
/// scraping engine, which keeps them consistent with its session state.
pub struct Transport {
    builder: ClientBuilder,
    proxied: bool,
}

impl Transport {
    pub fn is_proxied(&self) -> bool {
        self.proxied
    }

    pub(crate) fn into_builder(self) -> ClientBuilder {
        self.builder
    }
}

/// Build the transport for one request. Performs no I/O.
///
/// With a proxy every call egresses through it; without one, calls go direct
/// and proxy variables in the process environment are ignored.
pub fn configure_transport(proxy: Option<&ProxyConfig>) -> Result<Transport, GatewayError> {
    let builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
    let builder = match proxy {
        Some(proxy) => {
            let egress = reqwest::Proxy::all(proxy.url().as_str())
                .context("failed to configure forward proxy")?;
            builder.proxy(egress)
        }
        None => builder.no_proxy(),
    };

    Ok(Transport {
        builder,
        proxied: proxy.is_some(),
    })
}
