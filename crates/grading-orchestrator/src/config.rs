use std::path::Path;

use anyhow::Context;
use homework_grader_core::domain::EditorDefaults;
use serde::Deserialize;
type Result<T> = anyhow::Result<T>;

#[derive(Debug, Deserialize, Clone)]
pub struct GraderConfig {
    pub producer: ProducerConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl GraderConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to deserialize grader config")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProducerConfig {
    #[serde(rename = "type")]
    pub producer_type: ProducerType,
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProducerConfig {
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).with_context(|| {
            format!(
                "{} environment variable is not set for the grading producer",
                self.api_key_env
            )
        })
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProducerType {
    Gemini,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "default_max_score")]
    pub default_max_score: i64,
}

impl EditorConfig {
    pub fn defaults(&self) -> EditorDefaults {
        EditorDefaults::with_max_score(self.default_max_score)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_max_score: default_max_score(),
        }
    }
}

fn default_event_buffer_size() -> usize {
    1_000
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_score() -> i64 {
    EditorDefaults::MAX_SCORE
}
