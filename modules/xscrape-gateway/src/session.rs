use std::sync::Arc;

use anyhow::anyhow;
use cookie::Cookie;
use x_client::{SessionStore, AUTH_COOKIE, CSRF_COOKIE, PLATFORM_DOMAIN};

use crate::error::GatewayError;
use crate::request::SessionCredentials;

/// Create a fresh session store holding exactly this request's two tokens.
pub fn new_session(credentials: &SessionCredentials) -> Result<Arc<SessionStore>, GatewayError> {
    let store = SessionStore::new();
    inject_credentials(&store, credentials)?;
    Ok(Arc::new(store))
}

/// Write the session tokens into an empty store, scoped to the platform
/// domain and root path.
///
/// Refuses a store that already holds anything: stores are never shared
/// between requests.
pub fn inject_credentials(
    store: &SessionStore,
    credentials: &SessionCredentials,
) -> Result<(), GatewayError> {
    if !store.is_empty() {
        return Err(anyhow!("session store already holds {} cookies", store.len()).into());
    }

    store.insert(
        Cookie::build((AUTH_COOKIE, credentials.auth_token().to_string()))
            .domain(PLATFORM_DOMAIN)
            .path("/")
            .secure(true)
            .http_only(true)
            .build(),
    );
    store.insert(
        Cookie::build((CSRF_COOKIE, credentials.csrf_token().to_string()))
            .domain(PLATFORM_DOMAIN)
            .path("/")
            .secure(true)
            .build(),
    );
    Ok(())
}
