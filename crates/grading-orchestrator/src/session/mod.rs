//! 编辑会话模型与会话管理模块。

use chrono::{DateTime, Utc};
use homework_grader_core::domain::{GradingDocument, SubmissionId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// 会话管理器实现。
pub mod manager;
/// 导出会话管理器类型。
pub use manager::{GradingOutcome, SessionManager};

/// 会话唯一标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 生成新的随机会话 ID。
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 从字符串解析会话 ID。
    pub fn from_string(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value).map(Self)
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话运行状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// 会话空闲，可接收编辑。
    Ready,
    /// 正在等待 AI 评分结果，期间拒绝编辑。
    Grading {
        /// 进行中的请求票据。
        ticket: u64,
    },
}

impl SessionStatus {
    /// 当前是否有进行中的 AI 评分请求。
    pub fn is_grading(&self) -> bool {
        matches!(self, Self::Grading { .. })
    }

    /// 对外展示用的状态名。
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Grading { .. } => "grading",
        }
    }
}

/// 会话元数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// 会话 ID。
    pub id: SessionId,
    /// 被评分的提交 ID。
    pub submission_id: SubmissionId,
    /// 会话状态。
    pub status: SessionStatus,
    /// 会话打开时间（UTC）。
    pub opened_at: DateTime<Utc>,
}

impl Session {
    /// 获取会话 ID。
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// 获取会话状态。
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }
}

/// 会话元数据与当前文档的一致快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// 会话元数据。
    pub session: Session,
    /// 会话中的评分文档。
    pub document: GradingDocument,
}
