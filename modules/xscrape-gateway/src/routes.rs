use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Request,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::GatewayError;
use crate::request::ScrapeBody;
use crate::scrape::scrape;
use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/scrape", post(scrape_handler))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // method + path only; bodies carry credentials
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScrapeBody>, JsonRejection>,
) -> Response {
    let result = match body {
        Ok(Json(body)) => scrape(&state, body).await,
        Err(rejection) => Err(GatewayError::Validation(rejection.body_text())),
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}
