// Seam between the gateway and the scraping engine.
//
// ScrapeEngine is the engine's constructor: it receives the request's
// SessionClient and returns a PostSource bound to that session alone.
// PostSource is the retrieval capability: a lazy sequence of posts that may
// be abandoned at any point. Tests substitute both.

use futures::stream::{BoxStream, StreamExt};
use x_client::{PostRecord, XClient};

use crate::client::SessionClient;

pub type PostStream<'a> = BoxStream<'a, anyhow::Result<PostRecord>>;

pub trait PostSource: Send + Sync {
    /// Posts by `account_name`, in production order. `limit` is a hint the
    /// source may exceed; consumers enforce it.
    fn posts<'a>(&'a self, account_name: &'a str, limit: usize) -> PostStream<'a>;
}

pub trait ScrapeEngine: Send + Sync {
    fn open(&self, client: SessionClient) -> Box<dyn PostSource>;
}

/// Production engine backed by the X web client.
pub struct XEngine;

impl ScrapeEngine for XEngine {
    fn open(&self, client: SessionClient) -> Box<dyn PostSource> {
        Box::new(XClient::new(client.http, client.session))
    }
}

impl PostSource for XClient {
    fn posts<'a>(&'a self, account_name: &'a str, limit: usize) -> PostStream<'a> {
        self.user_posts(account_name, limit)
            .map(|item| item.map_err(anyhow::Error::from))
            .boxed()
    }
}
