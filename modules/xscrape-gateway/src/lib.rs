pub mod client;
pub mod config;
pub mod drain;
pub mod engine;
pub mod error;
pub mod request;
pub mod response;
pub mod routes;
pub mod scrape;
pub mod session;
pub mod transport;

use std::sync::Arc;

pub use config::Config;
pub use engine::{PostSource, PostStream, ScrapeEngine, XEngine};
pub use error::GatewayError;
pub use routes::router;

/// Process-wide state. Read-only after startup; requests share nothing else.
pub struct AppState {
    pub config: Config,
    pub engine: Arc<dyn ScrapeEngine>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn ScrapeEngine>) -> Self {
        Self { config, engine }
    }
}
