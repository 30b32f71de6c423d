use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use homework_grader_core::domain::{
    GradingDocument, GradingProducer, GradingProducerError, GradingRequest, ProblemBreakdown,
};
use tokio::sync::Notify;

#[derive(Clone)]
pub struct MockProducer {
    name: String,
    result: Result<GradingDocument, GradingProducerError>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl MockProducer {
    pub fn returning(document: GradingDocument) -> Self {
        Self {
            name: "mock".to_string(),
            result: Ok(document),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: GradingProducerError) -> Self {
        Self {
            name: "mock".to_string(),
            result: Err(error),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Holds every call until `release` is invoked.
    pub fn held(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GradingProducer for MockProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn grade(
        &self,
        _request: GradingRequest,
    ) -> Result<GradingDocument, GradingProducerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }
}

pub fn graded_document() -> GradingDocument {
    GradingDocument::from_problems(vec![
        ProblemBreakdown {
            score: 20,
            max_score: 25,
            ..ProblemBreakdown::default()
        },
        ProblemBreakdown {
            score: 15,
            max_score: 25,
            ..ProblemBreakdown::default()
        },
    ])
}

pub fn request() -> GradingRequest {
    GradingRequest::jpeg("aGVsbG8=")
}
