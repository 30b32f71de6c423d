//! API 路由模块。
//!
//! 提供班级、作业、提交、AI 评分与编辑会话的 HTTP 接口，以及评分事件的 WebSocket 推送。

pub mod classrooms;
pub mod error;
pub mod evaluation;
pub mod sessions;
pub mod state;
pub mod submissions;
pub mod ws;

use std::str::FromStr;
use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, routing::get};
use homework_grader_api_types::HealthCheckResponse;
use tower_http::cors::{Any, CorsLayer};

pub use classrooms::create_classroom_router;
pub use error::ApiError;
pub use evaluation::create_evaluation_router;
pub use sessions::create_session_router;
pub use state::AppState;
pub use submissions::create_submission_router;
pub use ws::websocket_handler;

/// 请求体上限，提交中包含 base64 编码的作业图片。
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// 组装完整的 HTTP 路由。
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/ws", get(websocket_handler))
        .merge(create_classroom_router())
        .merge(create_submission_router())
        .merge(create_evaluation_router())
        .merge(create_session_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

/// 解析路径中的 ID，无法解析时视为资源不存在。
pub(crate) fn parse_id<T: FromStr>(entity: &str, raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("{entity} not found: {raw}")))
}
