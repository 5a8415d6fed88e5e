use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::response::ErrorBody;

pub const MISSING_FIELDS: &str = "missing account name or session credentials";

/// Returned when a failure renders to an empty message.
pub const FALLBACK_MESSAGE: &str = "Failed to scrape tweets";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request is unusable as sent. Raised before any network activity.
    #[error("{0}")]
    Validation(String),

    #[error("scrape timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Transport, session, or engine failure.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn missing_fields() -> Self {
        GatewayError::Validation(MISSING_FIELDS.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Timeout(_) | GatewayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Single boundary where every scrape failure becomes a response.
/// The cause chain is logged here and never sent to the caller.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::Validation(message) => {
                warn!(error = %message, "Rejected scrape request");
            }
            GatewayError::Timeout(limit) => {
                error!(timeout_secs = limit.as_secs(), "Scrape timed out");
            }
            GatewayError::Upstream(err) => {
                error!(error = %err, "Scrape failed");
                for cause in err.chain().skip(1) {
                    error!(cause = %cause, "  caused by");
                }
            }
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
