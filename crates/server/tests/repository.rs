use homework_grader_core::domain::{
    AssignmentId, AssignmentTitle, ClassroomId, ClassroomName, GradingDocument, ProblemBreakdown,
    StudentId, Submission, SubmissionId, TeacherId,
};
use homework_grader_server::db;
use homework_grader_server::repository::{
    AssignmentRepository, ClassroomRepository, RepositoryError, SeaOrmAssignmentRepository,
    SeaOrmClassroomRepository, SeaOrmSubmissionRepository, SubmissionKey, SubmissionRepository,
};
use sea_orm::DatabaseConnection;

async fn connect() -> DatabaseConnection {
    db::init_pool_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory database should migrate")
}

fn name(value: &str) -> ClassroomName {
    ClassroomName::new(value).expect("valid classroom name")
}

fn title(value: &str) -> AssignmentTitle {
    AssignmentTitle::new(value).expect("valid assignment title")
}

fn student(value: &str) -> StudentId {
    StudentId::new(value).expect("valid student id")
}

#[tokio::test]
async fn classrooms_load_with_assignments_and_students() {
    let db = connect().await;
    let classrooms = SeaOrmClassroomRepository::new(db.clone());
    let assignments = SeaOrmAssignmentRepository::new(db.clone());

    let created = classrooms
        .create(name("Algebra 1"), TeacherId::placeholder())
        .await
        .expect("classroom should be created");
    assignments
        .create(created.id, title("Homework 1"))
        .await
        .expect("assignment should be created");
    classrooms
        .join(&created.secret_code, student("student-02"))
        .await
        .expect("student should join");

    let loaded = classrooms
        .find_by_id(created.id)
        .await
        .expect("query should succeed")
        .expect("classroom should exist");
    assert_eq!(loaded.name, "Algebra 1");
    assert_eq!(loaded.secret_code, created.secret_code);
    assert_eq!(loaded.assignments.len(), 1);
    assert_eq!(loaded.assignments[0].title, "Homework 1");
    assert_eq!(loaded.student_ids, vec![student("student-02")]);

    assert!(
        classrooms
            .find_by_id(ClassroomId::new())
            .await
            .expect("query should succeed")
            .is_none()
    );
}

#[tokio::test]
async fn join_codes_are_unique() {
    let db = connect().await;
    let classrooms = SeaOrmClassroomRepository::new(db);

    let mut codes = Vec::new();
    for index in 0..5 {
        let classroom = classrooms
            .create(name(&format!("Class {index}")), TeacherId::placeholder())
            .await
            .expect("classroom should be created");
        codes.push(classroom.secret_code.to_string());
    }

    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 5);
    assert_eq!(classrooms.list().await.expect("list should succeed").len(), 5);
}

#[tokio::test]
async fn joining_twice_conflicts() {
    let db = connect().await;
    let classrooms = SeaOrmClassroomRepository::new(db);
    let classroom = classrooms
        .create(name("Physics"), TeacherId::placeholder())
        .await
        .expect("classroom should be created");

    classrooms
        .join(&classroom.secret_code, student("student-01"))
        .await
        .expect("first join should succeed");
    let err = classrooms
        .join(&classroom.secret_code, student("student-01"))
        .await
        .expect_err("second join should conflict");

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
async fn assignment_requires_existing_classroom() {
    let db = connect().await;
    let assignments = SeaOrmAssignmentRepository::new(db);

    let err = assignments
        .create(ClassroomId::new(), title("Orphan"))
        .await
        .expect_err("unknown classroom should be rejected");

    assert!(matches!(
        err,
        RepositoryError::NotFound {
            entity: "classroom",
            ..
        }
    ));
}

async fn seeded() -> (
    SeaOrmSubmissionRepository,
    ClassroomId,
    AssignmentId,
    Submission,
) {
    let db = connect().await;
    let classrooms = SeaOrmClassroomRepository::new(db.clone());
    let assignments = SeaOrmAssignmentRepository::new(db.clone());
    let submissions = SeaOrmSubmissionRepository::new(db);

    let classroom = classrooms
        .create(name("Algebra 1"), TeacherId::placeholder())
        .await
        .expect("classroom should be created");
    let assignment = assignments
        .create(classroom.id, title("Homework 1"))
        .await
        .expect("assignment should be created");
    let submission = submissions
        .submit(
            classroom.id,
            assignment.id,
            Submission::new(student("student-01"), "aGVsbG8=", "hw.jpg"),
        )
        .await
        .expect("submission should be stored");

    (submissions, classroom.id, assignment.id, submission)
}

#[tokio::test]
async fn submit_replaces_previous_submission_of_same_student() {
    let (submissions, classroom_id, assignment_id, first) = seeded().await;

    let second = submissions
        .submit(
            classroom_id,
            assignment_id,
            Submission::new(student("student-01"), "d29ybGQ=", "hw-2.jpg"),
        )
        .await
        .expect("resubmission should be stored");
    submissions
        .submit(
            classroom_id,
            assignment_id,
            Submission::new(student("student-02"), "aGVsbG8=", "other.jpg"),
        )
        .await
        .expect("other student's submission should be stored");

    let listed = submissions
        .list_by_assignment(classroom_id, assignment_id)
        .await
        .expect("list should succeed");
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|s| s.id == second.id));
    assert!(listed.iter().all(|s| s.id != first.id));

    let err = submissions
        .find(SubmissionKey {
            classroom_id,
            assignment_id,
            submission_id: first.id,
        })
        .await
        .expect_err("replaced submission should be gone");
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn publish_persists_document_and_score() {
    let (submissions, classroom_id, assignment_id, submission) = seeded().await;
    let key = SubmissionKey {
        classroom_id,
        assignment_id,
        submission_id: submission.id,
    };
    let mut document = GradingDocument::from_problems(vec![ProblemBreakdown {
        score: 30,
        max_score: 25,
        ..ProblemBreakdown::default()
    }]);
    document.overall_score = 88;

    let published = submissions
        .publish(key, document.clone())
        .await
        .expect("publish should succeed");
    assert_eq!(published.score.value(), 88);
    assert_eq!(published.issues.len(), 1);

    let stored = submissions.find(key).await.expect("submission should exist");
    assert!(stored.is_graded);
    assert_eq!(stored.evaluation, Some(document));
}

#[tokio::test]
async fn publish_rejects_invalid_score_without_writing() {
    let (submissions, classroom_id, assignment_id, submission) = seeded().await;
    let key = SubmissionKey {
        classroom_id,
        assignment_id,
        submission_id: submission.id,
    };
    let document = GradingDocument {
        overall_score: -5,
        problem_breakdown: Vec::new(),
    };

    let err = submissions
        .publish(key, document)
        .await
        .expect_err("negative score should be rejected");
    assert!(matches!(err, RepositoryError::Domain(_)));

    let stored = submissions.find(key).await.expect("submission should exist");
    assert!(!stored.is_graded);
    assert!(stored.evaluation.is_none());
}

#[tokio::test]
async fn find_checks_the_whole_path() {
    let (submissions, classroom_id, assignment_id, submission) = seeded().await;

    let err = submissions
        .find(SubmissionKey {
            classroom_id: ClassroomId::new(),
            assignment_id,
            submission_id: submission.id,
        })
        .await
        .expect_err("wrong classroom should not resolve");
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = submissions
        .find(SubmissionKey {
            classroom_id,
            assignment_id,
            submission_id: SubmissionId::new(),
        })
        .await
        .expect_err("unknown submission should not resolve");
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}
