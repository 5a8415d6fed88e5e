use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xscrape_gateway::{router, AppState, Config, XEngine};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("xscrape_gateway=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let addr = format!("{}:{}", config.web_host, config.web_port);

    let state = Arc::new(AppState::new(config, Arc::new(XEngine)));
    let app = router(state);

    info!("xscrape gateway starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
