use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use homework_grader_core::domain::{
    EditOp, EditorDefaults, GradingDocument, GradingEditor, GradingProducerError, SubmissionId,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    EventBroadcaster, GradingEvent, OrchestratorError, Result, Session, SessionId,
    SessionSnapshot, SessionStatus,
};

struct SessionState {
    session: Session,
    editor: GradingEditor,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session.clone(),
            document: self.editor.document().clone(),
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.session.status.is_grading() {
            return Err(OrchestratorError::SessionBusy(self.session.id.to_string()));
        }
        Ok(())
    }
}

/// 一次 AI 评分请求的处理结果。
#[derive(Debug, Clone, PartialEq)]
pub enum GradingOutcome {
    /// 结果已替换会话中的文档。
    Merged(SessionSnapshot),
    /// 评分失败，文档保持不变。
    Failed(GradingProducerError),
    /// 会话已关闭或请求已取消，结果被丢弃。
    Discarded,
}

/// 编辑会话生命周期管理器。
///
/// 每个提交同一时间只有一个编辑会话；每次编辑与总分重算在同一把写锁内完成。
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
    event_broadcaster: Arc<EventBroadcaster>,
    next_ticket: AtomicU64,
}

impl SessionManager {
    /// 创建会话管理器。
    pub fn new(event_broadcaster: Arc<EventBroadcaster>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            event_broadcaster,
            next_ticket: AtomicU64::new(0),
        }
    }

    /// 为提交打开编辑会话。
    ///
    /// 同一提交已有的会话会被关闭，其未完成的 AI 评分结果随之作废。
    #[tracing::instrument(skip(self, document, defaults))]
    pub async fn open_session(
        &self,
        submission_id: SubmissionId,
        document: Option<GradingDocument>,
        defaults: EditorDefaults,
    ) -> SessionSnapshot {
        let session_id = SessionId::new();
        let editor = match document {
            Some(document) => GradingEditor::new(document, defaults),
            None => GradingEditor::blank(defaults),
        };

        let session = Session {
            id: session_id.clone(),
            submission_id,
            status: SessionStatus::Ready,
            opened_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        let replaced: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, state)| state.session.submission_id == submission_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &replaced {
            sessions.remove(id);
        }

        let state = SessionState { session, editor };
        let snapshot = state.snapshot();
        sessions.insert(session_id.clone(), state);
        drop(sessions);

        for id in replaced {
            info!(session_id = %id, %submission_id, "replacing existing session for submission");
            self.event_broadcaster
                .emit(GradingEvent::SessionClosed { session_id: id });
        }

        info!(
            session_id = %session_id,
            %submission_id,
            problems = snapshot.document.problem_breakdown.len(),
            "opened grading session"
        );
        self.event_broadcaster.emit(GradingEvent::SessionOpened {
            session_id,
            submission_id,
        });

        snapshot
    }

    /// 查询会话快照。
    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(SessionState::snapshot)
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))
    }

    /// 应用一次编辑。
    #[tracing::instrument(skip(self))]
    pub async fn apply_edit(&self, session_id: &SessionId, op: EditOp) -> Result<SessionSnapshot> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(session_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?;

        state.ensure_ready()?;
        state.editor.apply(op)?;
        let snapshot = state.snapshot();
        drop(sessions);

        self.event_broadcaster.emit(GradingEvent::DocumentEdited {
            session_id: session_id.clone(),
            overall_score: snapshot.document.overall_score,
        });

        Ok(snapshot)
    }

    /// 标记会话进入 AI 评分中状态，返回本次请求的票据。
    #[tracing::instrument(skip(self))]
    pub async fn begin_grading(&self, session_id: &SessionId) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(session_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?;

        state.ensure_ready()?;
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        state.session.status = SessionStatus::Grading { ticket };
        drop(sessions);

        info!(session_id = %session_id, ticket, "grading requested");
        self.event_broadcaster.emit(GradingEvent::GradingStarted {
            session_id: session_id.clone(),
            ticket,
        });

        Ok(ticket)
    }

    /// 合并 AI 评分结果。
    ///
    /// 只有会话仍然存在且仍持有同一票据时才会合并，否则结果被丢弃。
    #[tracing::instrument(skip(self, result))]
    pub async fn complete_grading(
        &self,
        session_id: &SessionId,
        ticket: u64,
        result: std::result::Result<GradingDocument, GradingProducerError>,
    ) -> GradingOutcome {
        let mut sessions = self.sessions.write().await;
        let current = sessions
            .get_mut(session_id)
            .filter(|state| state.session.status == SessionStatus::Grading { ticket });

        let Some(state) = current else {
            drop(sessions);
            info!(session_id = %session_id, ticket, "discarding stale grading result");
            self.event_broadcaster.emit(GradingEvent::GradingDiscarded {
                session_id: session_id.clone(),
                ticket,
            });
            return GradingOutcome::Discarded;
        };

        state.session.status = SessionStatus::Ready;
        match result {
            Ok(document) => {
                state.editor.replace_document(document);
                let snapshot = state.snapshot();
                drop(sessions);

                self.event_broadcaster.emit(GradingEvent::GradingCompleted {
                    session_id: session_id.clone(),
                    overall_score: snapshot.document.overall_score,
                });
                GradingOutcome::Merged(snapshot)
            }
            Err(err) => {
                drop(sessions);

                warn!(session_id = %session_id, ticket, error = %err, "grading failed");
                self.event_broadcaster.emit(GradingEvent::GradingFailed {
                    session_id: session_id.clone(),
                    error: err.to_string(),
                    retryable: err.is_retryable(),
                });
                GradingOutcome::Failed(err)
            }
        }
    }

    /// 取消进行中的 AI 评分，之后到达的结果将被丢弃。
    ///
    /// 返回是否确实有请求被取消。
    #[tracing::instrument(skip(self))]
    pub async fn cancel_grading(&self, session_id: &SessionId) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let state = sessions
            .get_mut(session_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?;

        let cancelled = state.session.status.is_grading();
        state.session.status = SessionStatus::Ready;

        if cancelled {
            info!(session_id = %session_id, "grading cancelled");
        }
        Ok(cancelled)
    }

    /// 获取可发布的文档快照；评分进行中时拒绝。
    pub async fn publishable_snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let state = sessions
            .get(session_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?;

        state.ensure_ready()?;
        Ok(state.snapshot())
    }

    /// 关闭并移除指定会话，返回关闭前的最终快照。
    #[tracing::instrument(skip(self))]
    pub async fn close_session(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        info!(session_id = %session_id, "closing session");

        let state = {
            let mut sessions = self.sessions.write().await;
            sessions
                .remove(session_id)
                .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?
        };

        self.event_broadcaster.emit(GradingEvent::SessionClosed {
            session_id: session_id.clone(),
        });

        Ok(state.snapshot())
    }

    /// 列出当前所有会话。
    pub async fn list_sessions(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .map(|state| state.session.clone())
            .collect()
    }

    /// 查询指定会话。
    pub async fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|state| state.session.clone())
    }
}
