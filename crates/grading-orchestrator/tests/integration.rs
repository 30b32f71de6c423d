mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{MockProducer, graded_document, request};
use grading_orchestrator::{
    GraderConfig, GradingEvent, GradingOutcome, Orchestrator, OrchestratorError, SessionId,
    SessionStatus,
};
use homework_grader_core::domain::{
    EditOp, GradingProducerError, GradingRequest, Points, ProblemField, SubmissionId,
};

fn basic_config_toml() -> &'static str {
    r#"
event_buffer_size = 64

[producer]
type = "gemini"
model = "gemini-2.5-flash"
api_key_env = "HOMEWORK_GRADER_TEST_UNSET_KEY"

[editor]
default_max_score = 10
"#
}

fn orchestrator_with(producer: MockProducer) -> Arc<Orchestrator> {
    let config = GraderConfig::from_str(basic_config_toml()).expect("config should parse");
    Arc::new(Orchestrator::with_producer(config, Arc::new(producer)))
}

async fn wait_for_calls(producer: &MockProducer, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while producer.calls() < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("producer should be called");
}

#[test]
fn test_config_parsing() {
    let config = GraderConfig::from_str(basic_config_toml()).expect("config should parse");

    assert_eq!(config.event_buffer_size, 64);
    assert_eq!(config.producer.model, "gemini-2.5-flash");
    assert_eq!(config.editor.default_max_score, 10);
}

#[test]
fn test_orchestrator_requires_api_key() {
    let config = GraderConfig::from_str(basic_config_toml()).expect("config should parse");

    let err = Orchestrator::new(config)
        .err()
        .expect("missing API key should fail initialization");
    assert!(err.to_string().contains("HOMEWORK_GRADER_TEST_UNSET_KEY"));
}

#[test]
fn test_subscribe_events() {
    let orchestrator = orchestrator_with(MockProducer::returning(graded_document()));

    let mut stream = orchestrator.subscribe_events();
    assert!(stream.try_recv().is_err());
    assert_eq!(orchestrator.producer_name(), "mock");
}

#[tokio::test]
async fn test_session_not_found() {
    let orchestrator = orchestrator_with(MockProducer::returning(graded_document()));

    let missing_session = SessionId::new();
    let result = orchestrator
        .apply_edit(&missing_session, EditOp::AddProblem)
        .await
        .expect_err("apply_edit should fail for missing session");

    match result {
        OrchestratorError::SessionNotFound(id) => assert_eq!(id, missing_session.to_string()),
        other => panic!("expected SessionNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_manual_grading_uses_configured_defaults() {
    let orchestrator = orchestrator_with(MockProducer::returning(graded_document()));
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;

    let snapshot = orchestrator
        .apply_edit(&opened.session.id, EditOp::AddProblem)
        .await
        .expect("add problem should apply");

    assert_eq!(snapshot.document.problem_breakdown.len(), 1);
    assert_eq!(snapshot.document.problem_breakdown[0].max_score, 10);
    assert_eq!(snapshot.document.overall_score, 0);
}

#[tokio::test]
async fn test_evaluate_merges_producer_result() {
    let orchestrator = orchestrator_with(MockProducer::returning(graded_document()));
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;
    let session_id = opened.session.id.clone();
    let mut events = orchestrator.subscribe_events();

    let outcome = orchestrator
        .evaluate(&session_id, request())
        .await
        .expect("evaluate should run");

    match outcome {
        GradingOutcome::Merged(snapshot) => {
            assert_eq!(snapshot.document, graded_document());
            assert_eq!(snapshot.document.overall_score, 70);
        }
        other => panic!("expected Merged, got: {other:?}"),
    }

    assert!(matches!(
        events.try_recv().expect("started event"),
        GradingEvent::GradingStarted { .. }
    ));
    assert_eq!(
        events.try_recv().expect("completed event"),
        GradingEvent::GradingCompleted {
            session_id,
            overall_score: 70
        }
    );
}

#[tokio::test]
async fn test_failed_evaluation_leaves_document_unchanged() {
    let orchestrator = orchestrator_with(MockProducer::failing(GradingProducerError::Timeout));
    let opened = orchestrator
        .open_session(SubmissionId::new(), Some(graded_document()))
        .await;
    let session_id = opened.session.id.clone();

    let outcome = orchestrator
        .evaluate(&session_id, request())
        .await
        .expect("evaluate should run");

    match outcome {
        GradingOutcome::Failed(err) => assert!(err.is_retryable()),
        other => panic!("expected Failed, got: {other:?}"),
    }

    let snapshot = orchestrator
        .snapshot(&session_id)
        .await
        .expect("session should exist");
    assert_eq!(snapshot.document, graded_document());
    assert_eq!(snapshot.session.status, SessionStatus::Ready);
}

#[tokio::test]
async fn test_edits_rejected_while_evaluation_in_flight() {
    let producer = MockProducer::returning(graded_document()).held();
    let orchestrator = orchestrator_with(producer.clone());
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;
    let session_id = opened.session.id.clone();

    let task = {
        let orchestrator = orchestrator.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move { orchestrator.evaluate(&session_id, request()).await })
    };
    wait_for_calls(&producer, 1).await;

    let err = orchestrator
        .apply_edit(&session_id, EditOp::AddProblem)
        .await
        .expect_err("edits must wait for the producer");
    assert!(matches!(err, OrchestratorError::SessionBusy(_)));

    let err = orchestrator
        .publishable_snapshot(&session_id)
        .await
        .expect_err("publishing must wait for the producer");
    assert!(matches!(err, OrchestratorError::SessionBusy(_)));

    producer.release();
    let outcome = task
        .await
        .expect("task should join")
        .expect("evaluate should run");
    assert!(matches!(outcome, GradingOutcome::Merged(_)));

    orchestrator
        .apply_edit(&session_id, EditOp::AddProblem)
        .await
        .expect("edits resume after the result is merged");
}

#[tokio::test]
async fn test_cancelled_evaluation_is_discarded() {
    let producer = MockProducer::returning(graded_document()).held();
    let orchestrator = orchestrator_with(producer.clone());
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;
    let session_id = opened.session.id.clone();

    let task = {
        let orchestrator = orchestrator.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move { orchestrator.evaluate(&session_id, request()).await })
    };
    wait_for_calls(&producer, 1).await;

    assert!(
        orchestrator
            .cancel_grading(&session_id)
            .await
            .expect("session should exist")
    );
    orchestrator
        .apply_edit(
            &session_id,
            EditOp::SetOverallScore { score: 42 },
        )
        .await
        .expect("teacher keeps editing after cancelling");

    producer.release();
    let outcome = task
        .await
        .expect("task should join")
        .expect("evaluate should run");
    assert_eq!(outcome, GradingOutcome::Discarded);

    let snapshot = orchestrator
        .snapshot(&session_id)
        .await
        .expect("session should exist");
    assert!(snapshot.document.problem_breakdown.is_empty());
    assert_eq!(snapshot.document.overall_score, 42);
}

#[tokio::test]
async fn test_close_session_discards_late_result() {
    let producer = MockProducer::returning(graded_document()).held();
    let orchestrator = orchestrator_with(producer.clone());
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;
    let session_id = opened.session.id.clone();

    let task = {
        let orchestrator = orchestrator.clone();
        let session_id = session_id.clone();
        tokio::spawn(async move { orchestrator.evaluate(&session_id, request()).await })
    };
    wait_for_calls(&producer, 1).await;

    orchestrator
        .close_session(&session_id)
        .await
        .expect("session should close");
    producer.release();

    let outcome = task
        .await
        .expect("task should join")
        .expect("evaluate should run");
    assert_eq!(outcome, GradingOutcome::Discarded);
    assert!(orchestrator.active_sessions().await.is_empty());
}

#[tokio::test]
async fn test_score_edit_after_evaluation_recomputes() {
    let orchestrator = orchestrator_with(MockProducer::returning(graded_document()));
    let opened = orchestrator.open_session(SubmissionId::new(), None).await;
    let session_id = opened.session.id.clone();

    orchestrator
        .evaluate(&session_id, request())
        .await
        .expect("evaluate should run");
    let snapshot = orchestrator
        .apply_edit(
            &session_id,
            EditOp::SetProblemField {
                problem_index: 1,
                edit: ProblemField::Score(Points(25)),
            },
        )
        .await
        .expect("edit should apply");

    assert_eq!(snapshot.document.overall_score, 90);
}

#[tokio::test]
async fn test_evaluate_once() {
    let producer = MockProducer::returning(graded_document());
    let orchestrator = orchestrator_with(producer.clone());

    let document = orchestrator
        .evaluate_once(request())
        .await
        .expect("one-shot grading should succeed");

    assert_eq!(document, graded_document());
    assert_eq!(producer.calls(), 1);
    assert!(orchestrator.active_sessions().await.is_empty());
}

#[tokio::test]
#[ignore = "requires API_KEY and network access to the grading producer"]
async fn test_live_grading() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config_path = manifest_dir.join("../../grader.toml");

    let config =
        GraderConfig::from_file(&config_path).expect("should load config from grader.toml");
    let orchestrator = Orchestrator::new(config).expect("orchestrator should initialize");

    // 1x1 white JPEG
    let image = "/9j/4AAQSkZJRgABAQEASABIAAD/2wBDAP//////////////////////////////////////////////////////////////////////////////////////wgALCAABAAEBAREA/8QAFBABAAAAAAAAAAAAAAAAAAAAAP/aAAgBAQABPxA=";
    let document = orchestrator
        .evaluate_once(GradingRequest::jpeg(image))
        .await
        .expect("live grading should return a document");

    assert!((0..=100).contains(&document.overall_score));
}
