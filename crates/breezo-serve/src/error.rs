use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use breezo_features::FeatureError;
use breezo_model::ModelError;
use serde_json::json;
use tracing::{error, warn};

/// Errors raised while serving predictions.
///
/// Request-level variants map onto HTTP statuses through [`IntoResponse`];
/// the body is always `{"error": "<message>"}`.
///
/// | Variant | Status |
/// |---|---|
/// | [`ServeError::MalformedJson`] | 400 |
/// | [`ServeError::InputSchema`] | 400 |
/// | [`ServeError::UnknownCategory`] | 422 |
/// | anything else | 500 |
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The body is not JSON at all.
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// A required field is absent or has the wrong type.
    #[error("{0}")]
    InputSchema(String),

    /// A categorical value the model never saw during training.
    #[error("{0}")]
    UnknownCategory(#[source] FeatureError),

    /// Any other failure while answering a request.
    #[error("prediction failed: {0}")]
    Unclassified(String),

    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server terminated")]
    Server(#[source] std::io::Error),
}

impl ServeError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::MalformedJson(_) | ServeError::InputSchema(_) => StatusCode::BAD_REQUEST,
            ServeError::UnknownCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServeError::Unclassified(_) | ServeError::Bind { .. } | ServeError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ModelError> for ServeError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Feature(e @ FeatureError::UnknownCategory { .. }) => {
                ServeError::UnknownCategory(e)
            }
            ModelError::Feature(e @ FeatureError::NonFiniteAge { .. }) => {
                ServeError::InputSchema(e.to_string())
            }
            other => ServeError::Unclassified(other.to_string()),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %message, "request failed");
        } else {
            warn!(%status, error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
