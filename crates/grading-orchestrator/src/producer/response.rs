//! 模型返回内容的解析。
//!
//! 返回结果必须严格匹配评分文档结构，否则整体丢弃。

use homework_grader_core::domain::{GradingDocument, GradingProducerError, Score};
use serde_json::Value;

/// 去掉模型有时会包裹在 JSON 外面的 Markdown 代码块标记。
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// 把模型输出文本解析为评分文档，总分必须落在 0..=100。
pub fn parse_document(text: &str) -> Result<GradingDocument, GradingProducerError> {
    let document: GradingDocument = serde_json::from_str(strip_code_fences(text))
        .map_err(|err| GradingProducerError::MalformedResponse(err.to_string()))?;

    Score::new(document.overall_score)
        .map_err(|err| GradingProducerError::MalformedResponse(err.to_string()))?;
    Ok(document)
}

/// 从 `generateContent` 响应中取出第一个候选结果的文本。
pub fn candidate_text(body: &Value) -> Result<String, GradingProducerError> {
    if let Some(reason) = body
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Err(GradingProducerError::MalformedResponse(format!(
            "prompt was blocked: {reason}"
        )));
    }

    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            GradingProducerError::MalformedResponse("response has no candidate content".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(GradingProducerError::MalformedResponse(
            "candidate content is empty".to_string(),
        ));
    }

    Ok(text)
}
