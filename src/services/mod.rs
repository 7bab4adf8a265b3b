// AI Detector Core Services

pub mod error;
pub mod gatekeeper;
pub mod interpreter;
pub mod classifier;
pub mod config_store;
pub mod detector;

pub use error::DetectError;
pub use gatekeeper::{truncate_chars, InputPolicy, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MIN_INPUT_LENGTH};
pub use interpreter::{bucket_for, interpret, AI_DETECTED_ABOVE, LIKELY_HUMAN_BELOW};
pub use classifier::{
    get_api_key,
    parse_inference_body,
    ClassifierError,
    HuggingFaceClassifier,
    LabelMap,
    TextClassifier,
};
pub use config_store::*;
pub use detector::{build_detector, Detector};
