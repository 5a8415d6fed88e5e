use std::sync::Arc;

use anyhow::Context;
use x_client::SessionStore;

use crate::error::GatewayError;
use crate::transport::Transport;

/// Transport and session store composed into the single client one request
/// hands to the scraping engine.
pub struct SessionClient {
    pub http: reqwest::Client,
    pub session: Arc<SessionStore>,
}

/// Bind a request's transport to its session store. No caching, no pooling:
/// every call yields an independent client.
pub fn build_client(
    transport: Transport,
    session: Arc<SessionStore>,
) -> Result<SessionClient, GatewayError> {
    let http = transport
        .into_builder()
        .cookie_provider(session.clone())
        .build()
        .context("failed to build scraping client")?;
    Ok(SessionClient { http, session })
}
