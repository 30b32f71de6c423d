use super::protocol::{ServerMessage, SessionInfoMessage};
use crate::events::GradingEvent;
use crate::session::{Session, SessionSnapshot};

/// 将内部 GradingEvent 转换为 WebSocket ServerMessage。
pub fn event_to_server_message(event: GradingEvent) -> ServerMessage {
    match event {
        GradingEvent::SessionOpened {
            session_id,
            submission_id,
        } => ServerMessage::SessionOpened {
            session_id: session_id.to_string(),
            submission_id: submission_id.to_string(),
        },
        GradingEvent::DocumentEdited {
            session_id,
            overall_score,
        } => ServerMessage::DocumentEdited {
            session_id: session_id.to_string(),
            overall_score,
        },
        GradingEvent::GradingStarted { session_id, ticket } => ServerMessage::GradingStarted {
            session_id: session_id.to_string(),
            ticket,
        },
        GradingEvent::GradingCompleted {
            session_id,
            overall_score,
        } => ServerMessage::GradingCompleted {
            session_id: session_id.to_string(),
            overall_score,
        },
        GradingEvent::GradingFailed {
            session_id,
            error,
            retryable,
        } => ServerMessage::GradingFailed {
            session_id: session_id.to_string(),
            error,
            retryable,
        },
        GradingEvent::GradingDiscarded { session_id, ticket } => {
            ServerMessage::GradingDiscarded {
                session_id: session_id.to_string(),
                ticket,
            }
        }
        GradingEvent::SessionClosed { session_id } => ServerMessage::SessionClosed {
            session_id: session_id.to_string(),
        },
    }
}

/// 将会话快照转换为文档消息。
pub fn snapshot_to_server_message(snapshot: SessionSnapshot) -> ServerMessage {
    ServerMessage::Document {
        session_id: snapshot.session.id.to_string(),
        status: snapshot.session.status.label().to_string(),
        document: snapshot.document,
    }
}

pub fn session_info(session: &Session) -> SessionInfoMessage {
    SessionInfoMessage {
        session_id: session.id.to_string(),
        submission_id: session.submission_id.to_string(),
        status: session.status.label().to_string(),
        opened_at: session.opened_at.to_rfc3339(),
    }
}
