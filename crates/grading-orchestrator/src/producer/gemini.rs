//! Gemini 评分服务实现。
//!
//! 通过 `generateContent` HTTP 接口发送图片与固定评分指令，
//! 并要求模型按评分文档结构返回 JSON。

use std::time::Duration;

use async_trait::async_trait;
use homework_grader_core::domain::{
    GradingDocument, GradingProducer, GradingProducerError, GradingRequest,
};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::prompt::{GRADING_INSTRUCTION, USER_INSTRUCTION, response_schema};
use super::response::{candidate_text, parse_document};
use crate::config::ProducerConfig;
use crate::error::{OrchestratorError, Result};

/// Gemini 评分服务客户端。
pub struct GeminiProducer {
    name: String,
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiProducer {
    /// 创建客户端，API Key 从配置指定的环境变量中读取。
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// 使用显式传入的 API Key 创建客户端。
    pub fn with_api_key(config: &ProducerConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| OrchestratorError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            name: format!("gemini:{}", config.model),
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, request: &GradingRequest) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": GRADING_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": request.mime_type,
                            "data": request.image_base64
                        }
                    },
                    { "text": USER_INSTRUCTION }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": self.temperature
            }
        })
    }
}

fn transport_error(err: reqwest::Error) -> GradingProducerError {
    if err.is_timeout() {
        GradingProducerError::Timeout
    } else {
        GradingProducerError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl GradingProducer for GeminiProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn grade(
        &self,
        request: GradingRequest,
    ) -> std::result::Result<GradingDocument, GradingProducerError> {
        info!(
            producer = %self.name,
            image_bytes = request.image_base64.len(),
            "requesting grading from producer"
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(producer = %self.name, %status, "grading producer returned an error status");
            return Err(GradingProducerError::Unavailable(format!(
                "{status}: {detail}"
            )));
        }

        let body: Value = response.json().await.map_err(|err| {
            if err.is_decode() {
                GradingProducerError::MalformedResponse(err.to_string())
            } else {
                transport_error(err)
            }
        })?;

        let document = parse_document(&candidate_text(&body)?)?;
        info!(
            producer = %self.name,
            overall_score = document.overall_score,
            problems = document.problem_breakdown.len(),
            "grading producer returned a document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraderConfig;

    fn producer() -> GeminiProducer {
        let config = GraderConfig::from_str(
            r#"
[producer]
type = "gemini"
model = "gemini-2.5-flash"
endpoint = "https://example.invalid/v1beta/"
temperature = 0.2
"#,
        )
        .expect("config should parse");

        GeminiProducer::with_api_key(&config.producer, "test-key").expect("client should build")
    }

    #[test]
    fn url_targets_configured_model() {
        assert_eq!(
            producer().generate_url(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_carries_image_and_schema() {
        let producer = producer();
        let body = producer.request_body(&GradingRequest::jpeg("aGVsbG8="));

        let image = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(image["mimeType"], "image/jpeg");
        assert_eq!(image["data"], "aGVsbG8=");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"],
            response_schema()
        );
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            GRADING_INSTRUCTION
        );
    }

    #[test]
    fn name_includes_model() {
        assert_eq!(producer().name(), "gemini:gemini-2.5-flash");
    }
}
