//! WebSocket API 模块，仅在 `ws-api` feature 启用时可用。

mod adapter;
mod handler;
mod protocol;

pub use adapter::{event_to_server_message, session_info, snapshot_to_server_message};
pub use handler::{handle_client_message, handle_socket};
pub use protocol::{ClientMessage, ServerMessage, SessionInfoMessage};
