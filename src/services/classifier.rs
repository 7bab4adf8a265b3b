// Text Classifier Service
// Capability trait for the opaque detection model plus the hosted inference client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use crate::models::{ClassLabel, ClassificationResult, ModelOutput};

use super::config_store::{ClassifierConfig, ConfigStore};
use super::error::DetectError;

const API_KEY_PROVIDER: &str = "huggingface";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
}

impl From<ClassifierError> for DetectError {
    fn from(err: ClassifierError) -> Self {
        DetectError::InferenceFailure(err.to_string())
    }
}

/// An opaque text-classification model.
///
/// Implementations receive text already truncated to the model budget and
/// return the model's raw `{label, score}` entries.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<ModelOutput>, ClassifierError>;

    /// Model identifier used in logs and health output.
    fn name(&self) -> &str;
}

/// Translates model label strings into [`ClassLabel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    pub ai_label: String,
    pub human_label: String,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new("Fake", "Real")
    }
}

impl LabelMap {
    pub fn new(ai_label: impl Into<String>, human_label: impl Into<String>) -> Self {
        Self {
            ai_label: ai_label.into(),
            human_label: human_label.into(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.ai_label.clone(), config.human_label.clone())
    }

    pub fn label(&self, raw: &str) -> Result<ClassLabel, DetectError> {
        if raw == self.ai_label {
            Ok(ClassLabel::Ai)
        } else if raw == self.human_label {
            Ok(ClassLabel::Human)
        } else {
            Err(DetectError::InvalidModelOutput(format!(
                "unrecognized label '{}' (expected '{}' or '{}')",
                raw, self.ai_label, self.human_label
            )))
        }
    }

    /// Pick the top-scoring entry and map it to a classification.
    pub fn resolve(&self, outputs: &[ModelOutput]) -> Result<ClassificationResult, DetectError> {
        let top = outputs
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| DetectError::InvalidModelOutput("model returned no labels".into()))?;

        Ok(ClassificationResult::new(self.label(&top.label)?, top.score))
    }
}

#[derive(Debug, Clone, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Text-classification responses come back either flat or nested per input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<ModelOutput>>),
    Flat(Vec<ModelOutput>),
}

pub fn parse_inference_body(body: &str) -> Result<Vec<ModelOutput>, ClassifierError> {
    let data: InferenceResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::JsonError(e.to_string()))?;

    let outputs = match data {
        InferenceResponse::Flat(items) => items,
        InferenceResponse::Nested(rows) => rows.into_iter().next().unwrap_or_default(),
    };

    if outputs.is_empty() {
        return Err(ClassifierError::MissingContent);
    }
    Ok(outputs)
}

/// Client for a hosted text-classification inference endpoint.
pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HuggingFaceClassifier {
    pub fn new(config: &ClassifierConfig, api_key: Option<String>) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base = config.base_url.trim_end_matches('/');
        let endpoint = if config.model.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, config.model)
        };

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<ModelOutput>, ClassifierError> {
        let start = Instant::now();

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&InferenceRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let outputs = parse_inference_body(&body)?;

        debug!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            labels = outputs.len(),
            "classifier.response"
        );

        Ok(outputs)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Get inference API token from environment or config file
pub fn get_api_key(store: Option<&ConfigStore>) -> Option<String> {
    for key in ["HF_API_TOKEN", "AI_DETECTOR_HF_API_TOKEN"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    let store = store?;
    match store.get_api_key(API_KEY_PROVIDER) {
        Ok(Some(key)) if !key.trim().is_empty() => Some(key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn output(label: &str, score: f64) -> ModelOutput {
        ModelOutput {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_label_map_resolves_top_entry() {
        let map = LabelMap::default();
        let result = map
            .resolve(&[output("Real", 0.2), output("Fake", 0.8)])
            .unwrap();
        assert_eq!(result.label, ClassLabel::Ai);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_label_map_rejects_unknown_label() {
        let map = LabelMap::default();
        let err = map.resolve(&[output("LABEL_7", 0.9)]).unwrap_err();
        assert!(matches!(err, DetectError::InvalidModelOutput(_)));
    }

    #[test]
    fn test_label_map_rejects_empty_output() {
        let err = LabelMap::default().resolve(&[]).unwrap_err();
        assert!(matches!(err, DetectError::InvalidModelOutput(_)));
    }

    #[test]
    fn test_custom_labels() {
        let map = LabelMap::new("machine", "human");
        assert_eq!(map.label("human").unwrap(), ClassLabel::Human);
        assert!(map.label("Real").is_err());
    }

    #[test]
    fn test_parse_flat_body() {
        let outputs = parse_inference_body(r#"[{"label":"Fake","score":0.99}]"#).unwrap();
        assert_eq!(outputs, vec![output("Fake", 0.99)]);
    }

    #[test]
    fn test_parse_nested_body() {
        let outputs = parse_inference_body(
            r#"[[{"label":"Real","score":0.95},{"label":"Fake","score":0.05}]]"#,
        )
        .unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].label, "Real");
    }

    #[test]
    fn test_parse_rejects_error_body() {
        let err = parse_inference_body(r#"{"error":"Model is currently loading"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::JsonError(_)));
        assert!(matches!(parse_inference_body("[]"), Err(ClassifierError::MissingContent)));
    }

    #[test]
    fn test_endpoint_joins_model() {
        let config = ClassifierConfig {
            base_url: "http://localhost:9000/models/".to_string(),
            model: "org/detector".to_string(),
            ..ClassifierConfig::default()
        };
        let classifier = HuggingFaceClassifier::new(&config, None).unwrap();
        assert_eq!(classifier.endpoint(), "http://localhost:9000/models/org/detector");
        assert_eq!(classifier.name(), "org/detector");
    }

    async fn spawn_mock(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_classify_against_mock_endpoint() {
        let app = Router::new().route(
            "/org/detector",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["inputs"], "some text");
                Json(serde_json::json!([[{"label": "Fake", "score": 0.99}, {"label": "Real", "score": 0.01}]]))
            }),
        );
        let base_url = spawn_mock(app).await;
        let config = ClassifierConfig {
            base_url,
            model: "org/detector".to_string(),
            ..ClassifierConfig::default()
        };

        let classifier = HuggingFaceClassifier::new(&config, Some("hf_test".into())).unwrap();
        let outputs = classifier.classify("some text").await.unwrap();
        assert_eq!(outputs[0], output("Fake", 0.99));
    }

    #[tokio::test]
    async fn test_classify_surfaces_api_error() {
        let app = Router::new().route(
            "/org/detector",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        );
        let base_url = spawn_mock(app).await;
        let config = ClassifierConfig {
            base_url,
            model: "org/detector".to_string(),
            ..ClassifierConfig::default()
        };

        let classifier = HuggingFaceClassifier::new(&config, None).unwrap();
        let err = classifier.classify("some text").await.unwrap_err();
        match err {
            ClassifierError::ApiError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "loading");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
