use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use breezo_features::DEFAULT_TOP_K;
use breezo_model::{DiagnosisModel, RankedDiagnosis};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::{PredictRequest, ServeError};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    model: Arc<DiagnosisModel>,
    top_k: usize,
}

impl AppState {
    #[must_use]
    pub fn new(model: DiagnosisModel) -> Self {
        Self {
            model: Arc::new(model),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of diagnoses returned per request.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn model(&self) -> &DiagnosisModel {
        &self.model
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    run_id: String,
    n_classes: usize,
    n_features: usize,
    n_trees: usize,
}

/// Build the router: `POST /predict`, `GET /health`, CORS open to any origin.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// [`ServeError::Bind`] when the address is unavailable and
/// [`ServeError::Server`] if the accept loop fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    info!(
        %addr,
        run_id = state.model.run_id(),
        top_k = state.top_k,
        "listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Server)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = &state.model;
    Json(HealthResponse {
        status: "ok",
        run_id: model.run_id().to_string(),
        n_classes: model.n_classes(),
        n_features: model.n_features(),
        n_trees: model.n_trees(),
    })
}

async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<RankedDiagnosis>>, ServeError> {
    let request = PredictRequest::from_slice(&body).inspect_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "invalid prediction request");
    })?;
    debug!(?request, "prediction request");

    let model = Arc::clone(&state.model);
    let top_k = state.top_k;
    let observation = request.into_observation();
    let ranked = tokio::task::spawn_blocking(move || {
        model
            .predict(&observation, top_k)
            .inspect_err(|e| warn!(error = %e, ?observation, "prediction failed"))
    })
    .await
    .map_err(|e| ServeError::Unclassified(format!("prediction worker failed: {e}")))??;

    Ok(Json(ranked))
}
