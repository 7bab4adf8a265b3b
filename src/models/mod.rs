// AI Detector Data Models
// Request/response payloads and the values flowing through a detection

use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Classifier Output ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLabel {
    Ai,
    Human,
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => write!(f, "AI"),
            Self::Human => write!(f, "Human"),
        }
    }
}

/// One `{label, score}` entry as returned by the text-classification model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub label: String,
    pub score: f64,
}

/// Model output after its label has been mapped onto a known class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: ClassLabel,
    /// Model confidence for `label`, expected in [0, 1].
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn new(label: ClassLabel, confidence: f64) -> Self {
        Self { label, confidence }
    }
}

// ============ Verdict ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    AiDetected,
    Uncertain,
    LikelyHuman,
}

impl Bucket {
    /// Short message shown to users and returned by the API.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::AiDetected => "AI Content Detected",
            Self::Uncertain => "Mixed / Uncertain",
            Self::LikelyHuman => "Likely Human Written",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AiDetected => {
                "This text contains highly structured patterns typical of AI models."
            }
            Self::Uncertain => {
                "The text is ambiguous. It might be heavily edited or too short to determine."
            }
            Self::LikelyHuman => "This text shows natural variation and authentic human tone.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Probability the text is AI-generated, 0-100 with one decimal.
    pub ai_probability_percent: f64,
    pub bucket: Bucket,
}

impl Verdict {
    pub fn is_ai(&self) -> bool {
        self.bucket == Bucket::AiDetected
    }
}

// ============ HTTP API ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub is_ai: bool,
    pub score: f64,
    pub message: String,
}

impl DetectResponse {
    /// Failure payload; the API reports these with a success status.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_ai: false,
            score: 0.0,
            message: message.into(),
        }
    }
}

impl From<Verdict> for DetectResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            is_ai: verdict.is_ai(),
            score: verdict.ai_probability_percent,
            message: verdict.bucket.headline().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model: String,
    pub version: String,
}
