use std::sync::Arc;

use homework_grader_core::domain::{
    EditOp, EditorDefaults, GradingDocument, GradingProducer, GradingProducerError,
    GradingRequest, SubmissionId,
};
use tracing::{error, info};

use crate::producer::build_producer;
use crate::{
    EventBroadcaster, EventStream, GraderConfig, GradingOutcome, Result, Session, SessionId,
    SessionManager, SessionSnapshot,
};

pub struct Orchestrator {
    config: Arc<GraderConfig>,
    producer: Arc<dyn GradingProducer>,
    session_manager: Arc<SessionManager>,
    event_broadcaster: Arc<EventBroadcaster>,
}

impl Orchestrator {
    pub fn new(config: GraderConfig) -> Result<Self> {
        let producer = build_producer(&config.producer)?;
        Ok(Self::with_producer(config, producer))
    }

    pub fn with_producer(config: GraderConfig, producer: Arc<dyn GradingProducer>) -> Self {
        info!(
            event_buffer_size = config.event_buffer_size,
            producer = producer.name(),
            default_max_score = config.editor.default_max_score,
            "initializing orchestrator"
        );

        let event_broadcaster = Arc::new(EventBroadcaster::new(config.event_buffer_size));
        let session_manager = Arc::new(SessionManager::new(event_broadcaster.clone()));

        Self {
            config: Arc::new(config),
            producer,
            session_manager,
            event_broadcaster,
        }
    }

    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    pub fn editor_defaults(&self) -> EditorDefaults {
        self.config.editor.defaults()
    }

    pub async fn open_session(
        &self,
        submission_id: SubmissionId,
        document: Option<GradingDocument>,
    ) -> SessionSnapshot {
        self.session_manager
            .open_session(submission_id, document, self.editor_defaults())
            .await
    }

    pub async fn snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        self.session_manager.snapshot(session_id).await
    }

    pub async fn apply_edit(&self, session_id: &SessionId, op: EditOp) -> Result<SessionSnapshot> {
        self.session_manager.apply_edit(session_id, op).await
    }

    /// Requests AI grading for an open session and waits for the outcome.
    ///
    /// The producer call runs on its own task so the result is merged or
    /// discarded even if the caller stops waiting.
    pub async fn evaluate(
        &self,
        session_id: &SessionId,
        request: GradingRequest,
    ) -> Result<GradingOutcome> {
        let ticket = self.session_manager.begin_grading(session_id).await?;

        let producer = self.producer.clone();
        let manager = self.session_manager.clone();
        let task_session_id = session_id.clone();
        let task = tokio::spawn(async move {
            let result = producer.grade(request).await;
            manager
                .complete_grading(&task_session_id, ticket, result)
                .await
        });

        match task.await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(session_id = %session_id, ticket, error = %err, "grading task aborted");
                let outcome = self
                    .session_manager
                    .complete_grading(
                        session_id,
                        ticket,
                        Err(GradingProducerError::Unavailable(err.to_string())),
                    )
                    .await;
                Ok(outcome)
            }
        }
    }

    /// Grades an image without an editing session.
    pub async fn evaluate_once(&self, request: GradingRequest) -> Result<GradingDocument> {
        info!(producer = self.producer.name(), "one-shot grading requested");
        Ok(self.producer.grade(request).await?)
    }

    pub async fn cancel_grading(&self, session_id: &SessionId) -> Result<bool> {
        self.session_manager.cancel_grading(session_id).await
    }

    pub async fn publishable_snapshot(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        self.session_manager.publishable_snapshot(session_id).await
    }

    pub async fn close_session(&self, session_id: &SessionId) -> Result<SessionSnapshot> {
        self.session_manager.close_session(session_id).await
    }

    pub fn subscribe_events(&self) -> EventStream {
        self.event_broadcaster.subscribe()
    }

    pub async fn active_sessions(&self) -> Vec<Session> {
        self.session_manager.list_sessions().await
    }

    pub async fn get_session(&self, session_id: &SessionId) -> Option<Session> {
        self.session_manager.get_session(session_id).await
    }
}
