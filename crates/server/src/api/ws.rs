//! WebSocket API 处理器包装。
//!
//! 将统一的应用状态适配到 grading_orchestrator 的 WebSocket 连接处理。

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;
use grading_orchestrator::ws_api::handle_socket;
use tracing::info;

use super::state::AppState;

/// Axum WebSocket 升级 handler，使用统一的 AppState。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("new WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state.orchestrator.clone()))
}
