use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::adapter::{event_to_server_message, session_info, snapshot_to_server_message};
use super::protocol::{ClientMessage, ServerMessage};
use crate::orchestrator::Orchestrator;
use crate::session::SessionId;

/// 驱动单个 WebSocket 连接：转发评分事件并处理客户端请求。
pub async fn handle_socket(socket: WebSocket, orchestrator: Arc<Orchestrator>) {
    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(64);
    info!("WebSocket connection established");

    let writer_task = tokio::spawn(async move {
        while let Some(server_msg) = out_rx.recv().await {
            match serde_json::to_string(&server_msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!(error = %err, "failed to serialize WebSocket message");
                    break;
                }
            }
        }
    });

    let mut event_stream = orchestrator.subscribe_events();
    let event_tx = out_tx.clone();
    let event_task = tokio::spawn(async move {
        loop {
            match event_stream.recv().await {
                Ok(event) => {
                    let msg = event_to_server_message(event);
                    if event_tx.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "event stream receive failed");
                    let _ = event_tx
                        .send(ServerMessage::Error {
                            message: format!("event stream error: {err}"),
                        })
                        .await;
                    break;
                }
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    let response = handle_client_message(&orchestrator, client_msg).await;
                    if out_tx.send(response).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    if out_tx
                        .send(ServerMessage::Error {
                            message: format!("invalid message: {err}"),
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "WebSocket receive error");
                break;
            }
        }
    }

    event_task.abort();
    drop(out_tx);
    if let Err(err) = writer_task.await {
        warn!(error = %err, "WebSocket writer task exited with join error");
    }

    info!("WebSocket connection closed");
}

/// 处理一条客户端消息并生成响应。
pub async fn handle_client_message(orchestrator: &Orchestrator, msg: ClientMessage) -> ServerMessage {
    match msg {
        ClientMessage::ApplyEdit { session_id, op } => {
            let sid = match parse_session_id(&session_id) {
                Ok(sid) => sid,
                Err(msg) => return msg,
            };

            match orchestrator.apply_edit(&sid, op).await {
                Ok(snapshot) => snapshot_to_server_message(snapshot),
                Err(err) => ServerMessage::Error {
                    message: format!("apply edit failed: {err}"),
                },
            }
        }
        ClientMessage::GetSession { session_id } => {
            let sid = match parse_session_id(&session_id) {
                Ok(sid) => sid,
                Err(msg) => return msg,
            };

            match orchestrator.snapshot(&sid).await {
                Ok(snapshot) => snapshot_to_server_message(snapshot),
                Err(err) => ServerMessage::Error {
                    message: format!("get session failed: {err}"),
                },
            }
        }
        ClientMessage::CancelGrading { session_id } => {
            let sid = match parse_session_id(&session_id) {
                Ok(sid) => sid,
                Err(msg) => return msg,
            };

            match orchestrator.cancel_grading(&sid).await {
                Ok(cancelled) => ServerMessage::GradingCancelled {
                    session_id,
                    cancelled,
                },
                Err(err) => ServerMessage::Error {
                    message: format!("cancel grading failed: {err}"),
                },
            }
        }
        ClientMessage::ListSessions => {
            let sessions = orchestrator.active_sessions().await;
            ServerMessage::SessionList {
                sessions: sessions.iter().map(session_info).collect(),
            }
        }
    }
}

fn parse_session_id(value: &str) -> Result<SessionId, ServerMessage> {
    SessionId::from_string(value).map_err(|err| ServerMessage::Error {
        message: format!("invalid session_id: {err}"),
    })
}
