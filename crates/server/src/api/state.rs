//! 统一的应用状态。

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use grading_orchestrator::{Orchestrator, SessionId};
use homework_grader_core::domain::SubmissionId;
use sea_orm::DatabaseConnection;
use tokio::sync::RwLock;

use super::error::ApiError;
use crate::repository::{
    AssignmentRepository, ClassroomRepository, SeaOrmAssignmentRepository,
    SeaOrmClassroomRepository, SeaOrmSubmissionRepository, SubmissionKey, SubmissionRepository,
};

/// 统一的应用状态，包含所有服务共享的数据。
#[derive(Clone)]
pub struct AppState {
    /// 评分编排器。
    pub orchestrator: Arc<Orchestrator>,
    /// 班级仓储。
    pub classrooms: Arc<dyn ClassroomRepository>,
    /// 作业仓储。
    pub assignments: Arc<dyn AssignmentRepository>,
    /// 提交仓储。
    pub submissions: Arc<dyn SubmissionRepository>,
    /// 编辑会话对应的提交路径。
    session_keys: Arc<RwLock<HashMap<SessionId, SubmissionKey>>>,
}

impl AppState {
    /// 创建新的应用状态。
    pub fn new(orchestrator: Arc<Orchestrator>, db: DatabaseConnection) -> Self {
        Self {
            orchestrator,
            classrooms: Arc::new(SeaOrmClassroomRepository::new(db.clone())),
            assignments: Arc::new(SeaOrmAssignmentRepository::new(db.clone())),
            submissions: Arc::new(SeaOrmSubmissionRepository::new(db)),
            session_keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 记录会话对应的提交；同一提交的旧会话记录被移除。
    pub async fn track_session(&self, session_id: SessionId, key: SubmissionKey) {
        let mut keys = self.session_keys.write().await;
        keys.retain(|_, existing| existing.submission_id != key.submission_id);
        keys.insert(session_id, key);
    }

    /// 查询会话对应的提交。
    pub async fn session_key(&self, session_id: &SessionId) -> Result<SubmissionKey, ApiError> {
        self.session_keys
            .read()
            .await
            .get(session_id)
            .copied()
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::NOT_FOUND,
                    "SESSION_NOT_FOUND",
                    format!("session not found: {session_id}"),
                )
            })
    }

    /// 移除会话记录。
    pub async fn forget_session(&self, session_id: &SessionId) {
        self.session_keys.write().await.remove(session_id);
    }

    /// 移除并返回该提交当前的会话记录。
    pub async fn take_submission_session(&self, submission_id: SubmissionId) -> Option<SessionId> {
        let mut keys = self.session_keys.write().await;
        let session_id = keys
            .iter()
            .find(|(_, key)| key.submission_id == submission_id)
            .map(|(session_id, _)| session_id.clone())?;
        keys.remove(&session_id);
        Some(session_id)
    }
}
