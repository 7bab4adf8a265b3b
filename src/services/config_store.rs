// Configuration Storage Service
// Handles config file loading, validation and environment overrides

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::gatekeeper::{InputPolicy, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MIN_INPUT_LENGTH};

pub const APP_DIR_NAME: &str = "ai-detector";
pub const DEFAULT_MODEL: &str = "openai-community/roberta-base-openai-detector";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            detection: DetectionConfig::default(),
            classifier: ClassifierConfig::default(),
            api_keys: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_min_input_length")]
    pub min_input_length: usize,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_input_length: DEFAULT_MIN_INPUT_LENGTH,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl DetectionConfig {
    pub fn input_policy(&self) -> InputPolicy {
        InputPolicy::new(self.min_input_length, self.max_input_chars)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model label meaning "AI-generated".
    #[serde(default = "default_ai_label")]
    pub ai_label: String,
    /// Model label meaning "human-written".
    #[serde(default = "default_human_label")]
    pub human_label: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Run one probe classification at startup.
    #[serde(default)]
    pub warm_up: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            ai_label: default_ai_label(),
            human_label: default_human_label(),
            timeout_secs: default_timeout_secs(),
            warm_up: false,
        }
    }
}

fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_min_input_length() -> usize { DEFAULT_MIN_INPUT_LENGTH }
fn default_max_input_chars() -> usize { DEFAULT_MAX_INPUT_CHARS }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_base_url() -> String { DEFAULT_INFERENCE_URL.to_string() }
fn default_ai_label() -> String { "Fake".to_string() }
fn default_human_label() -> String { "Real".to_string() }
fn default_timeout_secs() -> u64 { 60 }

impl AppConfig {
    /// Apply `AI_DETECTOR_*` environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(model) = env_value("AI_DETECTOR_MODEL") {
            self.classifier.model = model;
        }
        if let Some(url) = env_value("AI_DETECTOR_INFERENCE_URL") {
            self.classifier.base_url = url;
        }
        if let Some(min) = env_value("AI_DETECTOR_MIN_INPUT_LENGTH").and_then(|v| v.parse().ok()) {
            self.detection.min_input_length = min;
        }
        if let Some(max) = env_value("AI_DETECTOR_MAX_INPUT_CHARS").and_then(|v| v.parse().ok()) {
            self.detection.max_input_chars = max;
        }
    }

    /// Reject settings that would send empty text or never time out.
    pub fn validate(&self) -> Result<(), String> {
        if self.detection.max_input_chars == 0 {
            return Err("detection.maxInputChars must be at least 1".to_string());
        }
        if self.classifier.timeout_secs == 0 {
            return Err("classifier.timeoutSecs must be at least 1".to_string());
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct ConfigStore {
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.json"),
        }
    }

    /// Store backed by an explicit file path.
    pub fn from_file(config_file: PathBuf) -> Self {
        Self { config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
    }

    /// Store at the explicit path if given, else the platform config dir.
    pub fn resolve(config_path: Option<&Path>) -> Self {
        match config_path {
            Some(path) => Self::from_file(path.to_path_buf()),
            None => Self::new(Self::default_config_dir().unwrap_or_else(|| PathBuf::from("."))),
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Get inference API key from config file
    pub fn get_api_key(&self, provider: &str) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(provider).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.min_input_length, 2);
        assert_eq!(config.detection.max_input_chars, 512);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.classifier.ai_label, "Fake");
        assert!(!config.classifier.warm_up);
    }

    #[test]
    fn test_validate_rejects_zero_budget_and_timeout() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.detection.max_input_chars = 0;
        assert!(config.validate().unwrap_err().contains("maxInputChars"));

        let mut config = AppConfig::default();
        config.classifier.timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("timeoutSecs"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"detection": {"minInputLength": 20}}"#).unwrap();
        assert_eq!(parsed.detection.min_input_length, 20);
        assert_eq!(parsed.detection.max_input_chars, 512);
        assert_eq!(parsed.classifier.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        let config = store.load().unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        fs::write(store.config_file(), r#"{"server": {"port": 9100}}"#).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.server.host, "127.0.0.1");
    }

    #[test]
    fn test_api_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::from_file(dir.path().join("detector.json"));
        assert_eq!(store.get_api_key("huggingface").unwrap(), None);

        fs::write(store.config_file(), r#"{"apiKeys": {"huggingface": "hf_test"}}"#).unwrap();
        assert_eq!(store.get_api_key("huggingface").unwrap().as_deref(), Some("hf_test"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        fs::write(store.config_file(), "{ nope").unwrap();
        assert!(store.load().unwrap_err().contains("Failed to parse config"));
    }
}
