// Detection error taxonomy

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("Text cannot be empty")]
    EmptyInput,
    #[error("Text is too short. Please enter at least {min} characters (got {actual}).")]
    InputTooShort { min: usize, actual: usize },
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),
    #[error("Inference failed: {0}")]
    InferenceFailure(String),
    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),
}

impl DetectError {
    /// Errors caused by the submitted text rather than the model.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InputTooShort { .. })
    }
}
