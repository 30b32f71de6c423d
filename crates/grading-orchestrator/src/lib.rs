pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod producer;
pub mod session;

#[cfg(feature = "ws-api")]
pub mod ws_api;

pub use config::{EditorConfig, GraderConfig, ProducerConfig, ProducerType};
pub use error::{OrchestratorError, Result};
pub use events::{EventBroadcaster, EventStream, GradingEvent};
pub use orchestrator::Orchestrator;
pub use producer::GeminiProducer;
pub use session::{
    GradingOutcome, Session, SessionId, SessionManager, SessionSnapshot, SessionStatus,
};
