use anyhow::Result;
use homework_grader_core::domain::SubmissionId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::SessionId;

/// 编排器对外广播的评分事件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradingEvent {
    /// 编辑会话已打开。
    SessionOpened {
        /// 会话 ID。
        session_id: SessionId,
        /// 被评分的提交 ID。
        submission_id: SubmissionId,
    },
    /// 文档已被编辑。
    DocumentEdited {
        /// 会话 ID。
        session_id: SessionId,
        /// 编辑后的总分。
        overall_score: i64,
    },
    /// AI 评分请求已发出。
    GradingStarted {
        /// 会话 ID。
        session_id: SessionId,
        /// 本次请求的票据。
        ticket: u64,
    },
    /// AI 评分结果已合并进文档。
    GradingCompleted {
        /// 会话 ID。
        session_id: SessionId,
        /// 评分服务给出的总分。
        overall_score: i64,
    },
    /// AI 评分失败，文档保持不变。
    GradingFailed {
        /// 会话 ID。
        session_id: SessionId,
        /// 错误描述。
        error: String,
        /// 教师是否可以重试。
        retryable: bool,
    },
    /// 过期的 AI 评分结果已被丢弃。
    GradingDiscarded {
        /// 会话 ID。
        session_id: SessionId,
        /// 被丢弃的票据。
        ticket: u64,
    },
    /// 会话已关闭。
    SessionClosed {
        /// 会话 ID。
        session_id: SessionId,
    },
}

/// 基于 `tokio::broadcast` 的事件广播器。
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<GradingEvent>,
}

impl EventBroadcaster {
    /// 创建事件广播器。
    ///
    /// `capacity` 表示内部广播队列容量。
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 广播一个事件。
    pub fn emit(&self, event: GradingEvent) {
        let _ = self.sender.send(event);
    }

    /// 订阅事件流。
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
        }
    }
}

/// 事件接收流包装器。
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<GradingEvent>,
}

impl EventStream {
    /// 异步接收下一条事件。
    pub async fn recv(&mut self) -> Result<GradingEvent> {
        Ok(self.receiver.recv().await?)
    }

    /// 非阻塞尝试接收一条事件。
    pub fn try_recv(&mut self) -> Result<GradingEvent> {
        Ok(self.receiver.try_recv()?)
    }
}
