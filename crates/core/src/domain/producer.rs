use async_trait::async_trait;
use thiserror::Error;

use super::GradingDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingRequest {
    pub image_base64: String,
    pub mime_type: String,
}

impl GradingRequest {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/jpeg";

    pub fn jpeg(image_base64: impl Into<String>) -> Self {
        Self {
            image_base64: image_base64.into(),
            mime_type: Self::DEFAULT_MIME_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GradingProducerError {
    #[error("grading producer unavailable: {0}")]
    Unavailable(String),
    #[error("grading producer timeout")]
    Timeout,
    #[error("grading producer returned a malformed document: {0}")]
    MalformedResponse(String),
}

impl GradingProducerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

#[async_trait]
pub trait GradingProducer: Send + Sync {
    fn name(&self) -> &str;

    async fn grade(&self, request: GradingRequest) -> Result<GradingDocument, GradingProducerError>;
}
