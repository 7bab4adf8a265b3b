// Detection Pipeline
// Gatekeeper -> classifier (one call) -> score interpreter

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::models::Verdict;

use super::classifier::{get_api_key, HuggingFaceClassifier, LabelMap, TextClassifier};
use super::config_store::{AppConfig, ConfigStore};
use super::error::DetectError;
use super::gatekeeper::InputPolicy;
use super::interpreter::interpret;

const WARM_UP_TEXT: &str = "This sentence checks that the detection model is reachable.";

/// Shared detection entry point, built once per process.
pub struct Detector {
    classifier: Arc<dyn TextClassifier>,
    policy: InputPolicy,
    labels: LabelMap,
}

impl Detector {
    pub fn new(classifier: Arc<dyn TextClassifier>, policy: InputPolicy, labels: LabelMap) -> Self {
        Self {
            classifier,
            policy,
            labels,
        }
    }

    pub fn policy(&self) -> &InputPolicy {
        &self.policy
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    /// Validate, classify and interpret a single text.
    pub async fn detect(&self, text: &str) -> Result<Verdict, DetectError> {
        let admitted = self.policy.admit(text)?;
        let start = Instant::now();

        let outputs = self.classifier.classify(admitted).await.map_err(|e| {
            warn!(model = self.classifier.name(), error = %e, "detect.inference_failed");
            DetectError::from(e)
        })?;

        let result = self.labels.resolve(&outputs)?;
        let verdict = interpret(result)?;

        info!(
            chars = admitted.chars().count(),
            label = %result.label,
            confidence = result.confidence,
            percent = verdict.ai_probability_percent,
            bucket = verdict.bucket.headline(),
            latency_ms = start.elapsed().as_millis() as u64,
            "detect.completed"
        );

        Ok(verdict)
    }
}

/// Build the hosted-model detector described by `config`.
///
/// With `classifier.warm_up` set, one probe classification must succeed.
pub async fn build_detector(
    config: &AppConfig,
    store: Option<&ConfigStore>,
) -> Result<Detector, DetectError> {
    let api_key = get_api_key(store);
    if api_key.is_none() {
        info!("No inference API token configured, sending anonymous requests");
    }

    let classifier = HuggingFaceClassifier::new(&config.classifier, api_key)
        .map_err(|e| DetectError::ModelUnavailable(e.to_string()))?;
    info!(endpoint = classifier.endpoint(), "classifier.created");

    let detector = Detector::new(
        Arc::new(classifier),
        config.detection.input_policy(),
        LabelMap::from_config(&config.classifier),
    );

    if config.classifier.warm_up {
        detector
            .classifier
            .classify(WARM_UP_TEXT)
            .await
            .map_err(|e| DetectError::ModelUnavailable(e.to_string()))?;
        info!(model = detector.model_name(), "classifier.warm_up_ok");
    }

    Ok(detector)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::ModelOutput;
    use crate::services::classifier::ClassifierError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Classifier returning a fixed answer and counting calls.
    pub struct StubClassifier {
        pub reply: Result<Vec<ModelOutput>, String>,
        pub calls: AtomicUsize,
        pub last_input: std::sync::Mutex<Option<String>>,
    }

    impl StubClassifier {
        pub fn answering(label: &str, score: f64) -> Self {
            Self {
                reply: Ok(vec![ModelOutput {
                    label: label.to_string(),
                    score,
                }]),
                calls: AtomicUsize::new(0),
                last_input: std::sync::Mutex::new(None),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                last_input: std::sync::Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextClassifier for StubClassifier {
        async fn classify(&self, text: &str) -> Result<Vec<ModelOutput>, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(text.to_string());
            match &self.reply {
                Ok(outputs) => Ok(outputs.clone()),
                Err(message) => Err(ClassifierError::ApiError {
                    status: 500,
                    message: message.clone(),
                }),
            }
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    pub fn detector_with(stub: Arc<StubClassifier>) -> Detector {
        Detector::new(stub, InputPolicy::default(), LabelMap::default())
    }
}
