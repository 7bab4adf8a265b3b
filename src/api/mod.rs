// HTTP API
// JSON detection endpoint and the router shared with the web UIs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{DetectRequest, DetectResponse, ErrorDetail, HealthResponse};
use crate::services::{DetectError, Detector, InputPolicy};
use crate::web;

pub const MODEL_NOT_LOADED: &str = "Backend Error: Model not loaded";
pub const ANALYSIS_FAILED: &str = "Analysis Failed";

/// State handed to every entry point.
#[derive(Clone)]
pub struct AppState {
    pub detector: Option<Arc<Detector>>,
    pub policy: InputPolicy,
    pub model: String,
    /// Reason the model could not be loaded, if any.
    pub load_error: Option<String>,
}

impl AppState {
    pub fn ready(detector: Detector) -> Self {
        Self {
            policy: *detector.policy(),
            model: detector.model_name().to_string(),
            detector: Some(Arc::new(detector)),
            load_error: None,
        }
    }

    pub fn unavailable(policy: InputPolicy, model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            detector: None,
            policy,
            model: model.into(),
            load_error: Some(reason.into()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/detect", post(detect_content))
        .route("/api/health", get(health))
        .route("/", get(web::app_page))
        .route("/studio", get(web::studio_page).post(web::studio_submit))
        .with_state(state)
}

fn bad_request(err: &DetectError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDetail {
            detail: err.to_string(),
        }),
    )
        .into_response()
}

/// `POST /api/detect`
pub async fn detect_content(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> Response {
    let span = info_span!("api.detect", request_id = %Uuid::new_v4());
    async move {
        if let Err(err) = state.policy.admit(&request.text) {
            return bad_request(&err);
        }

        let Some(detector) = state.detector.as_ref() else {
            warn!("detect requested without a loaded model");
            return Json(DetectResponse::failure(MODEL_NOT_LOADED)).into_response();
        };

        match detector.detect(&request.text).await {
            Ok(verdict) => Json(DetectResponse::from(verdict)).into_response(),
            Err(err) if err.is_input_error() => bad_request(&err),
            Err(err) => {
                error!(error = %err, "detect.failed");
                Json(DetectResponse::failure(ANALYSIS_FAILED)).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.detector.is_some();
    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "degraded" }.to_string(),
        model_loaded,
        model: state.model.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn spawn_app(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
