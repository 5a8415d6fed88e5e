use std::fmt;
use std::sync::{PoisonError, RwLock};

use cookie::{Cookie, CookieJar};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;

/// Domain every session cookie is scoped to.
pub const PLATFORM_DOMAIN: &str = "x.com";

/// Cookie holding the authenticated session.
pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie holding the CSRF token. Its value is mirrored into `x-csrf-token`.
pub const CSRF_COOKIE: &str = "ct0";

/// Cookie store backing exactly one scraping session.
///
/// The client reads and writes its authentication state here and nowhere
/// else, so a store handed to one `XClient` is that session's whole identity.
/// Plugged into reqwest through `ClientBuilder::cookie_provider`.
#[derive(Default)]
pub struct SessionStore {
    jar: RwLock<CookieJar>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a cookie. A leading dot on the domain is dropped.
    pub fn insert(&self, mut cookie: Cookie<'static>) {
        if let Some(domain) = cookie.domain() {
            if domain.starts_with('.') {
                let trimmed = domain.trim_start_matches('.').to_string();
                cookie.set_domain(trimmed);
            }
        }
        self.jar
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add(cookie);
    }

    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.get(name).map(|c| c.value().to_string())
    }

    /// Names of every cookie currently held, sorted.
    pub fn names(&self) -> Vec<String> {
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = jar.iter().map(|c| c.name().to_string()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.value(CSRF_COOKIE)
    }

    /// Serialized `Cookie` header value for a request to `url`, if any cookie applies.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let https = url.scheme() == "https";
        let jar = self.jar.read().unwrap_or_else(PoisonError::into_inner);

        let mut pairs: Vec<(String, String)> = jar
            .iter()
            .filter(|c| c.domain().is_some_and(|d| domain_matches(d, host)))
            .filter(|c| path_matches(c.path().unwrap_or("/"), url.path()))
            .filter(|c| https || !c.secure().unwrap_or(false))
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        if pairs.is_empty() {
            return None;
        }
        pairs.sort();
        Some(
            pairs
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

impl fmt::Debug for SessionStore {
    // Values are credentials; only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("cookies", &self.names())
            .finish()
    }
}

impl CookieStore for SessionStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            let Ok(mut cookie) = Cookie::parse(raw.to_string()) else {
                continue;
            };

            if is_removal(raw) {
                tracing::trace!(name = cookie.name(), "Session cookie cleared by response");
                self.jar
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(cookie);
                continue;
            }

            if cookie.domain().is_none() {
                if let Some(host) = url.host_str() {
                    cookie.set_domain(host.to_string());
                }
            }
            if cookie.path().is_none() {
                cookie.set_path("/");
            }
            self.insert(cookie);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self.header_for(url)?;
        HeaderValue::from_str(&header).ok()
    }
}

fn is_removal(raw: &str) -> bool {
    let lowercase = raw.to_ascii_lowercase();
    lowercase.contains("max-age=0")
        || lowercase.contains("max-age=-")
        || lowercase.contains("expires=thu, 01 jan 1970")
}

fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let domain = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_cookie(name: &str, value: &str, http_only: bool) -> Cookie<'static> {
        Cookie::build((name.to_string(), value.to_string()))
            .domain(PLATFORM_DOMAIN)
            .path("/")
            .secure(true)
            .http_only(http_only)
            .build()
    }

    fn seeded() -> SessionStore {
        let store = SessionStore::new();
        store.insert(session_cookie(AUTH_COOKIE, "auth123", true));
        store.insert(session_cookie(CSRF_COOKIE, "csrf456", false));
        store
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn new_store_is_empty() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        assert!(store.header_for(&url("https://x.com/")).is_none());
    }

    #[test]
    fn sends_both_cookies_to_platform_host_and_subdomains() {
        let store = seeded();
        let expected = "auth_token=auth123; ct0=csrf456";
        assert_eq!(
            store.header_for(&url("https://x.com/i/api/graphql/abc/UserTweets")).as_deref(),
            Some(expected)
        );
        assert_eq!(
            store.header_for(&url("https://api.x.com/1.1/foo.json")).as_deref(),
            Some(expected)
        );
    }

    #[test]
    fn secure_cookies_withheld_over_plain_http() {
        let store = seeded();
        assert!(store.header_for(&url("http://x.com/")).is_none());
    }

    #[test]
    fn other_domains_get_nothing() {
        let store = seeded();
        assert!(store.header_for(&url("https://example.com/")).is_none());
        assert!(store.header_for(&url("https://notx.com/")).is_none());
    }

    #[test]
    fn leading_dot_domain_is_normalized() {
        let store = SessionStore::new();
        let cookie = Cookie::build(("ct0", "v"))
            .domain(".x.com")
            .path("/")
            .secure(true)
            .build();
        store.insert(cookie);
        assert_eq!(store.get("ct0").unwrap().domain(), Some("x.com"));
    }

    #[test]
    fn response_cookies_update_and_clear_the_store() {
        let store = seeded();
        let set = [
            HeaderValue::from_static("ct0=rotated; Domain=.x.com; Path=/; Secure"),
            HeaderValue::from_static("guest_id=v1%3A1; Max-Age=0; Path=/"),
        ];
        store.set_cookies(&mut set.iter(), &url("https://x.com/i/api/graphql/q/UserTweets"));

        assert_eq!(store.csrf_token().as_deref(), Some("rotated"));
        assert_eq!(store.names(), vec!["auth_token", "ct0"]);

        let clear = [HeaderValue::from_static("ct0=; Max-Age=0; Domain=.x.com; Path=/")];
        store.set_cookies(&mut clear.iter(), &url("https://x.com/"));
        assert_eq!(store.names(), vec!["auth_token"]);
    }

    #[test]
    fn cookie_without_domain_binds_to_request_host() {
        let store = SessionStore::new();
        let set = [HeaderValue::from_static("lang=en")];
        store.set_cookies(&mut set.iter(), &url("https://x.com/home"));

        let cookie = store.get("lang").unwrap();
        assert_eq!(cookie.domain(), Some("x.com"));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn path_matching_respects_segment_boundaries() {
        assert!(path_matches("/", "/anything"));
        assert!(path_matches("/i/api", "/i/api/graphql"));
        assert!(!path_matches("/i/api", "/i/apiary"));
    }

    #[test]
    fn debug_output_hides_values() {
        let rendered = format!("{:?}", seeded());
        assert!(rendered.contains("auth_token"));
        assert!(!rendered.contains("auth123"));
    }
}
