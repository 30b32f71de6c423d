use homework_grader_core::domain::{DomainError, GradingProducerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("评分服务错误: {0}")]
    Producer(#[from] GradingProducerError),

    #[error("编辑被拒绝: {0}")]
    Edit(#[from] DomainError),

    #[error("会话未找到: {0}")]
    SessionNotFound(String),

    #[error("会话正在等待 AI 评分结果: {0}")]
    SessionBusy(String),

    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
