use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::client::build_client;
use crate::drain::drain;
use crate::error::GatewayError;
use crate::request::{validate, ScrapeBody};
use crate::response::ScrapeResponse;
use crate::session::new_session;
use crate::transport::configure_transport;
use crate::AppState;

/// Run one scrape end to end: validate, build an isolated session, drain the
/// engine up to the limit, project the results.
///
/// Every stage reports through `GatewayError`; nothing partial is returned.
pub async fn scrape(state: &AppState, body: ScrapeBody) -> Result<ScrapeResponse, GatewayError> {
    let request = validate(body, &state.config)?;

    let span = info_span!(
        "scrape",
        request_id = %Uuid::new_v4(),
        account = %request.account_name,
        limit = request.limit,
    );

    async move {
        let transport = configure_transport(state.config.proxy.as_ref())?;
        let proxied = transport.is_proxied();
        let session = new_session(&request.credentials)?;
        let client = build_client(transport, session)?;
        info!(proxied, "Session ready");

        let source = state.engine.open(client);
        let timeout = state.config.request_timeout;
        let posts = tokio::time::timeout(
            timeout,
            drain(source.posts(&request.account_name, request.limit), request.limit),
        )
        .await
        .map_err(|_| GatewayError::Timeout(timeout))??;

        info!(count = posts.len(), "Scrape complete");
        Ok(ScrapeResponse::from_posts(posts))
    }
    .instrument(span)
    .await
}
