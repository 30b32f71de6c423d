//! 评分编辑会话 API 路由。
//!
//! 教师打开某个提交的编辑会话，逐条提交编辑操作，可请求 AI 评分，最后发布成绩。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use grading_orchestrator::{GradingOutcome, SessionId, SessionSnapshot};
use homework_grader_api_types::{
    CancelGradingResponse, OpenSessionRequest, SessionResponse, SubmissionResponse,
};
use homework_grader_core::domain::{EditOp, GradingRequest};
use tracing::info;

use super::submissions::{publish, submission_key};
use super::{ApiError, AppState, parse_id};
use crate::repository::SubmissionKey;

/// 创建编辑会话 API 路由。
pub fn create_session_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/grading/sessions", post(open_session))
        .route(
            "/api/grading/sessions/{session_id}",
            get(get_session).delete(close_session),
        )
        .route("/api/grading/sessions/{session_id}/edits", post(apply_edit))
        .route("/api/grading/sessions/{session_id}/evaluate", post(evaluate))
        .route("/api/grading/sessions/{session_id}/cancel", post(cancel_grading))
        .route("/api/grading/sessions/{session_id}/publish", post(publish_session))
}

fn session_response(key: SubmissionKey, snapshot: SessionSnapshot) -> SessionResponse {
    SessionResponse {
        session_id: snapshot.session.id.to_string(),
        classroom_id: key.classroom_id.to_string(),
        assignment_id: key.assignment_id.to_string(),
        submission_id: key.submission_id.to_string(),
        status: snapshot.session.status.label().to_string(),
        opened_at: snapshot.session.opened_at,
        document: snapshot.document,
    }
}

async fn tracked_session(
    state: &AppState,
    raw: &str,
) -> Result<(SessionId, SubmissionKey), ApiError> {
    let session_id: SessionId = parse_id("session", raw)?;
    let key = state.session_key(&session_id).await?;
    Ok((session_id, key))
}

/// 为提交打开编辑会话，默认载入已保存的评分文档。
async fn open_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OpenSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let Json(request) = payload?;
    let key = submission_key(
        &request.classroom_id,
        &request.assignment_id,
        &request.submission_id,
    )?;

    let submission = state.submissions.find(key).await?;
    let document = if request.blank {
        None
    } else {
        submission.evaluation
    };

    let snapshot = state
        .orchestrator
        .open_session(key.submission_id, document)
        .await;
    state.track_session(snapshot.session.id.clone(), key).await;

    Ok((StatusCode::CREATED, Json(session_response(key, snapshot))))
}

/// 查询会话当前文档。
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session_id, key) = tracked_session(&state, &session_id).await?;
    let snapshot = state.orchestrator.snapshot(&session_id).await?;
    Ok(Json(session_response(key, snapshot)))
}

/// 应用一次编辑操作。
async fn apply_edit(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<EditOp>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session_id, key) = tracked_session(&state, &session_id).await?;
    let Json(op) = payload?;

    let snapshot = state.orchestrator.apply_edit(&session_id, op).await?;
    Ok(Json(session_response(key, snapshot)))
}

/// 请求 AI 评分并等待结果合并。
async fn evaluate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let (session_id, key) = tracked_session(&state, &session_id).await?;
    let submission = state.submissions.find(key).await?;

    let outcome = state
        .orchestrator
        .evaluate(&session_id, GradingRequest::jpeg(submission.file_data))
        .await?;

    match outcome {
        GradingOutcome::Merged(snapshot) => Ok(Json(session_response(key, snapshot))),
        GradingOutcome::Failed(err) => Err(err.into()),
        GradingOutcome::Discarded => Err(ApiError::new(
            StatusCode::CONFLICT,
            "GRADING_DISCARDED",
            "grading result was discarded because the request was cancelled",
        )),
    }
}

/// 取消进行中的 AI 评分。
async fn cancel_grading(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<CancelGradingResponse>, ApiError> {
    let (session_id, _) = tracked_session(&state, &session_id).await?;
    let cancelled = state.orchestrator.cancel_grading(&session_id).await?;

    Ok(Json(CancelGradingResponse {
        session_id: session_id.to_string(),
        cancelled,
    }))
}

/// 发布会话中的文档并关闭会话。
async fn publish_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let (session_id, key) = tracked_session(&state, &session_id).await?;
    let snapshot = state.orchestrator.publishable_snapshot(&session_id).await?;

    let submission = publish(&state, key, snapshot.document).await?;

    state.orchestrator.close_session(&session_id).await?;
    state.forget_session(&session_id).await;
    info!(session_id = %session_id, "session published and closed");

    Ok(Json(submission))
}

/// 放弃编辑并关闭会话。
async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (session_id, _) = tracked_session(&state, &session_id).await?;

    state.orchestrator.close_session(&session_id).await?;
    state.forget_session(&session_id).await;

    Ok(StatusCode::NO_CONTENT)
}
