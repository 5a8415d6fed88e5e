// Test doubles for the gateway.
//
// MockEngine (ScrapeEngine) hands out MockSource (PostSource) instances that
// ignore the requested limit and offer every post they have, so the gateway's
// own bounding is what gets tested. Each source records the session store it
// was opened with.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use futures::{stream, StreamExt};
use serde_json::Value;
use tower::ServiceExt;
use x_client::{PostRecord, SessionStore};

use xscrape_gateway::client::SessionClient;
use xscrape_gateway::{router, AppState, Config, PostSource, PostStream, ScrapeEngine};

/// Cookies a source saw when the engine asked it for posts.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub account: String,
    pub cookies: Vec<(String, String)>,
}

#[derive(Default)]
struct Inner {
    available: usize,
    fail_at: Option<usize>,
    stall: bool,
    opens: AtomicUsize,
    pulls: AtomicUsize,
    sessions: Mutex<Vec<SessionSnapshot>>,
}

#[derive(Clone)]
pub struct MockEngine {
    inner: Arc<Inner>,
}

impl MockEngine {
    fn build(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Offers `available` posts, then ends.
    pub fn with_posts(available: usize) -> Self {
        Self::build(Inner {
            available,
            ..Inner::default()
        })
    }

    /// Produces `produced` posts, then fails. Has plenty more behind the failure.
    pub fn failing_after(produced: usize) -> Self {
        Self::build(Inner {
            available: produced + 10,
            fail_at: Some(produced),
            ..Inner::default()
        })
    }

    /// Never yields anything.
    pub fn stalled() -> Self {
        Self::build(Inner {
            stall: true,
            ..Inner::default()
        })
    }

    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::SeqCst)
    }

    pub fn pulls(&self) -> usize {
        self.inner.pulls.load(Ordering::SeqCst)
    }

    pub fn sessions(&self) -> Vec<SessionSnapshot> {
        self.inner.sessions.lock().unwrap().clone()
    }

    pub fn session_for(&self, account: &str) -> SessionSnapshot {
        self.sessions()
            .into_iter()
            .find(|s| s.account == account)
            .unwrap_or_else(|| panic!("no session recorded for {account}"))
    }
}

impl ScrapeEngine for MockEngine {
    fn open(&self, client: SessionClient) -> Box<dyn PostSource> {
        self.inner.opens.fetch_add(1, Ordering::SeqCst);
        Box::new(MockSource {
            inner: self.inner.clone(),
            session: client.session,
        })
    }
}

struct MockSource {
    inner: Arc<Inner>,
    session: Arc<SessionStore>,
}

impl MockSource {
    fn record(&self, account: &str) {
        let cookies = self
            .session
            .names()
            .into_iter()
            .map(|name| {
                let value = self.session.value(&name).unwrap_or_default();
                (name, value)
            })
            .collect();
        self.inner.sessions.lock().unwrap().push(SessionSnapshot {
            account: account.to_string(),
            cookies,
        });
    }
}

impl PostSource for MockSource {
    fn posts<'a>(&'a self, account_name: &'a str, _limit: usize) -> PostStream<'a> {
        self.record(account_name);
        if self.inner.stall {
            return stream::pending().boxed();
        }

        stream::iter(0..self.inner.available)
            .then(move |i| async move {
                // Let concurrent requests interleave between pulls.
                tokio::task::yield_now().await;
                self.inner.pulls.fetch_add(1, Ordering::SeqCst);
                if self.inner.fail_at == Some(i) {
                    return Err(anyhow!("upstream rejected the session"));
                }
                Ok(mock_post(account_name, i))
            })
            .boxed()
    }
}

pub fn mock_post(account: &str, index: usize) -> PostRecord {
    let mut post = PostRecord::with_id(format!("{account}-{index}"));
    post.text = Some(format!("post number {index}"));
    post.username = Some(account.to_string());
    post.hashtags = vec!["internal-only".to_string()];
    post.timestamp = Some(1_700_000_000 + index as i64);
    post.likes = index as u64;
    post.permanent_url = Some(format!("https://x.com/{account}/status/{index}"));
    post
}

pub fn test_config() -> Config {
    Config::from_vars(|_| None).expect("default config")
}

pub fn app(engine: &MockEngine, config: Config) -> Router {
    router(Arc::new(AppState::new(config, Arc::new(engine.clone()))))
}

pub async fn post_scrape(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn send_raw(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}
