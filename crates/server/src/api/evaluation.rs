//! 一次性 AI 评分 API。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use homework_grader_api_types::EvaluateRequest;
use homework_grader_core::domain::{GradingDocument, GradingRequest};

use super::submissions::validate_file_data;
use super::{ApiError, AppState};

/// 创建评分 API 路由。
pub fn create_evaluation_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/evaluate", post(evaluate))
}

/// 将作业图片交给评分服务并直接返回评分文档。
async fn evaluate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<GradingDocument>, ApiError> {
    let Json(request) = payload?;
    validate_file_data(&request.file_data)?;

    let mut grading_request = GradingRequest::jpeg(request.file_data.trim());
    if let Some(mime_type) = request.mime_type {
        grading_request.mime_type = mime_type;
    }

    let document = state.orchestrator.evaluate_once(grading_request).await?;
    Ok(Json(document))
}
