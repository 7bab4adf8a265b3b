// Score Interpreter
// Maps a classifier result onto an AI-probability percentage and a verdict bucket

use crate::models::{Bucket, ClassLabel, ClassificationResult, Verdict};

use super::error::DetectError;

/// Percentages strictly above this are reported as AI content.
pub const AI_DETECTED_ABOVE: f64 = 50.0;
/// Percentages strictly below this are reported as human writing.
pub const LIKELY_HUMAN_BELOW: f64 = 20.0;

/// Interpret a classification as a verdict.
///
/// The confidence must be a finite value in [0, 1]. Boundary percentages
/// (exactly 20.0 or 50.0) land in [`Bucket::Uncertain`].
pub fn interpret(result: ClassificationResult) -> Result<Verdict, DetectError> {
    let confidence = result.confidence;
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(DetectError::InvalidModelOutput(format!(
            "confidence {} outside [0, 1]",
            confidence
        )));
    }

    let ai_probability = match result.label {
        ClassLabel::Ai => confidence,
        ClassLabel::Human => 1.0 - confidence,
    };
    let percent = round_one_decimal(ai_probability * 100.0);

    Ok(Verdict {
        ai_probability_percent: percent,
        bucket: bucket_for(percent),
    })
}

/// Bucket a percentage. Total over [0, 100]; comparisons are exclusive.
pub fn bucket_for(percent: f64) -> Bucket {
    if percent > AI_DETECTED_ABOVE {
        Bucket::AiDetected
    } else if percent < LIKELY_HUMAN_BELOW {
        Bucket::LikelyHuman
    } else {
        Bucket::Uncertain
    }
}

/// Round to one decimal on the exact decimal expansion of `value`.
///
/// Scaling by ten first would turn 50.04999... into 500.5 and round it up.
fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}
