//! 评分服务（Grading Producer）实现层。
//!
//! 核心 crate 只定义 `GradingProducer` 接口；这里负责把配置落地为具体的
//! 评分服务客户端，并统一处理模型返回内容的解析。

use std::sync::Arc;

use homework_grader_core::domain::GradingProducer;

use crate::config::{ProducerConfig, ProducerType};
use crate::error::Result;

pub mod gemini;
pub mod prompt;
pub mod response;

pub use gemini::GeminiProducer;

/// 根据配置构建评分服务客户端。
pub fn build_producer(config: &ProducerConfig) -> Result<Arc<dyn GradingProducer>> {
    match config.producer_type {
        ProducerType::Gemini => Ok(Arc::new(GeminiProducer::new(config)?)),
    }
}
