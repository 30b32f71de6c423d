use homework_grader_core::domain::{EditOp, GradingDocument};
use serde::{Deserialize, Serialize};

/// 客户端发送的 WebSocket 消息。
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 对指定会话应用一次编辑。
    ApplyEdit { session_id: String, op: EditOp },
    /// 查询指定会话的当前文档。
    GetSession { session_id: String },
    /// 取消进行中的 AI 评分。
    CancelGrading { session_id: String },
    /// 查询活跃会话列表。
    ListSessions,
}

/// 服务端发送的 WebSocket 消息。
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 会话已打开。
    SessionOpened {
        session_id: String,
        submission_id: String,
    },
    /// 会话当前文档。
    Document {
        session_id: String,
        status: String,
        document: GradingDocument,
    },
    /// 文档已被编辑。
    DocumentEdited {
        session_id: String,
        overall_score: i64,
    },
    /// AI 评分请求已发出。
    GradingStarted { session_id: String, ticket: u64 },
    /// AI 评分结果已合并。
    GradingCompleted {
        session_id: String,
        overall_score: i64,
    },
    /// AI 评分失败。
    GradingFailed {
        session_id: String,
        error: String,
        retryable: bool,
    },
    /// 过期结果已丢弃。
    GradingDiscarded { session_id: String, ticket: u64 },
    /// 取消请求的处理结果。
    GradingCancelled { session_id: String, cancelled: bool },
    /// 会话关闭通知。
    SessionClosed { session_id: String },
    /// 会话列表响应。
    SessionList { sessions: Vec<SessionInfoMessage> },
    /// 错误消息。
    Error { message: String },
}

/// 会话信息（WebSocket 传输用）。
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoMessage {
    pub session_id: String,
    pub submission_id: String,
    pub status: String,
    pub opened_at: String,
}
