#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use grading_orchestrator::{GraderConfig, Orchestrator};
use homework_grader_core::domain::{
    GradingDocument, GradingProducer, GradingProducerError, GradingRequest, ProblemBreakdown,
};
use homework_grader_server::{AppState, create_router, db};
use serde_json::Value;
use tokio::sync::Notify;
use tower::ServiceExt;

const CONFIG: &str = r#"
event_buffer_size = 64

[producer]
type = "gemini"
model = "gemini-2.5-flash"
"#;

#[derive(Clone)]
pub struct MockProducer {
    result: Result<GradingDocument, GradingProducerError>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl MockProducer {
    pub fn returning(document: GradingDocument) -> Self {
        Self {
            result: Ok(document),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: GradingProducerError) -> Self {
        Self {
            result: Err(error),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

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
        "mock"
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

pub async fn test_state(producer: MockProducer) -> Arc<AppState> {
    let db = db::init_pool_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory database should migrate");
    let config = GraderConfig::from_str(CONFIG).expect("config should parse");
    let orchestrator = Arc::new(Orchestrator::with_producer(config, Arc::new(producer)));
    Arc::new(AppState::new(orchestrator, db))
}

pub async fn test_app(producer: MockProducer) -> Router {
    create_router(test_state(producer).await)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

/// Creates a classroom, an assignment and one submission, returning their ids.
pub async fn seed_submission(app: &Router) -> (String, String, String) {
    let (status, classroom) = send(
        app,
        Method::POST,
        "/api/classrooms",
        Some(serde_json::json!({ "name": "Algebra 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let classroom_id = classroom["id"].as_str().expect("classroom id").to_string();

    let (status, assignment) = send(
        app,
        Method::POST,
        &format!("/api/classrooms/{classroom_id}/assignments"),
        Some(serde_json::json!({ "title": "Homework 3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let assignment_id = assignment["id"].as_str().expect("assignment id").to_string();

    let (status, submission) = send(
        app,
        Method::POST,
        &format!("/api/classrooms/{classroom_id}/assignments/{assignment_id}/submissions"),
        Some(serde_json::json!({
            "studentId": "student-01",
            "fileData": "aGVsbG8=",
            "fileName": "homework.jpg"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = submission["id"].as_str().expect("submission id").to_string();

    (classroom_id, assignment_id, submission_id)
}
