//! 作业提交与成绩发布 API 路由。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use homework_grader_api_types::{
    SubmissionResponse, SubmitAssignmentRequest, UpdateEvaluationRequest,
};
use homework_grader_core::domain::{GradingDocument, StudentId, Submission};
use tracing::{info, warn};

use super::{ApiError, AppState, parse_id};
use crate::repository::{PublishedSubmission, SubmissionKey};

/// 创建提交 API 路由。
pub fn create_submission_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/classrooms/{classroom_id}/assignments/{assignment_id}/submissions",
            post(submit_assignment).get(list_submissions),
        )
        .route(
            "/api/classrooms/{classroom_id}/assignments/{assignment_id}/submissions/{submission_id}",
            get(get_submission).put(publish_evaluation),
        )
}

/// 校验 base64 编码的图片数据。
pub(crate) fn validate_file_data(file_data: &str) -> Result<(), ApiError> {
    if file_data.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_FILE_DATA",
            "fileData (base64 string) is required",
        ));
    }

    STANDARD.decode(file_data.trim()).map_err(|err| {
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_FILE_DATA",
            format!("fileData is not valid base64: {err}"),
        )
    })?;
    Ok(())
}

pub(crate) fn submission_key(
    classroom_id: &str,
    assignment_id: &str,
    submission_id: &str,
) -> Result<SubmissionKey, ApiError> {
    Ok(SubmissionKey {
        classroom_id: parse_id("classroom", classroom_id)?,
        assignment_id: parse_id("assignment", assignment_id)?,
        submission_id: parse_id("submission", submission_id)?,
    })
}

/// 写入成绩并记录校验警告。
pub(crate) async fn publish(
    state: &AppState,
    key: SubmissionKey,
    document: GradingDocument,
) -> Result<SubmissionResponse, ApiError> {
    let overridden = document.is_overridden();
    let PublishedSubmission {
        submission,
        score,
        issues,
    } = state.submissions.publish(key, document).await?;

    for issue in &issues {
        warn!(submission_id = %key.submission_id, %issue, "published document has a validation issue");
    }
    info!(
        submission_id = %key.submission_id,
        score = score.value(),
        overridden,
        "evaluation published"
    );

    Ok(submission.into())
}

/// 学生提交作业，同一学生的旧提交会被替换。
async fn submit_assignment(
    State(state): State<Arc<AppState>>,
    Path((classroom_id, assignment_id)): Path<(String, String)>,
    payload: Result<Json<SubmitAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let classroom_id = parse_id("classroom", &classroom_id)?;
    let assignment_id = parse_id("assignment", &assignment_id)?;
    let Json(request) = payload?;

    let student_id = StudentId::new(request.student_id)?;
    validate_file_data(&request.file_data)?;
    if request.file_name.trim().is_empty() {
        return Err(ApiError::bad_request("INVALID_INPUT", "fileName is required"));
    }

    let submission = Submission::new(student_id, request.file_data.trim(), request.file_name);
    let stored = state
        .submissions
        .submit(classroom_id, assignment_id, submission)
        .await?;

    info!(
        %assignment_id,
        submission_id = %stored.id,
        student_id = %stored.student_id,
        "submission received"
    );
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// 列出作业下的提交。
async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path((classroom_id, assignment_id)): Path<(String, String)>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let classroom_id = parse_id("classroom", &classroom_id)?;
    let assignment_id = parse_id("assignment", &assignment_id)?;

    let submissions = state
        .submissions
        .list_by_assignment(classroom_id, assignment_id)
        .await?;
    Ok(Json(
        submissions
            .into_iter()
            .map(SubmissionResponse::from)
            .collect(),
    ))
}

/// 查询单个提交。
async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path((classroom_id, assignment_id, submission_id)): Path<(String, String, String)>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let key = submission_key(&classroom_id, &assignment_id, &submission_id)?;
    let submission = state.submissions.find(key).await?;
    Ok(Json(submission.into()))
}

/// 发布成绩：原样保存评分文档并标记为已评分，同时关闭该提交上打开的编辑会话。
async fn publish_evaluation(
    State(state): State<Arc<AppState>>,
    Path((classroom_id, assignment_id, submission_id)): Path<(String, String, String)>,
    payload: Result<Json<UpdateEvaluationRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let key = submission_key(&classroom_id, &assignment_id, &submission_id)?;
    let Json(request) = payload?;

    let submission = publish(&state, key, request.evaluation).await?;

    if let Some(session_id) = state.take_submission_session(key.submission_id).await {
        match state.orchestrator.close_session(&session_id).await {
            Ok(_) => info!(
                session_id = %session_id,
                submission_id = %key.submission_id,
                "editing session closed by direct publish"
            ),
            Err(err) => warn!(session_id = %session_id, error = %err, "failed to close editing session"),
        }
    }

    Ok(Json(submission))
}
