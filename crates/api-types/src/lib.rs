//! Shared request/response types used by API-facing crates.
//!
//! Registry payloads use camelCase field names; the grading document keeps its
//! snake_case shape.

use chrono::{DateTime, Utc};
use homework_grader_core::domain::{
    Assignment, AssignmentId, Classroom, ClassroomId, GradingDocument, StudentId, Submission,
    SubmissionId, TeacherId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Convenience alias for handlers that prefer a shorter type name.
pub type HealthResponse = HealthCheckResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomResponse {
    pub id: ClassroomId,
    pub name: String,
    pub teacher_id: TeacherId,
    pub secret_code: String,
    pub assignments: Vec<AssignmentResponse>,
    pub student_ids: Vec<StudentId>,
}

impl From<Classroom> for ClassroomResponse {
    fn from(classroom: Classroom) -> Self {
        Self {
            id: classroom.id,
            name: classroom.name,
            teacher_id: classroom.teacher_id,
            secret_code: classroom.secret_code.to_string(),
            assignments: classroom
                .assignments
                .into_iter()
                .map(AssignmentResponse::from)
                .collect(),
            student_ids: classroom.student_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub submissions: Vec<SubmissionResponse>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            title: assignment.title,
            created_at: assignment.created_at,
            submissions: assignment
                .submissions
                .into_iter()
                .map(SubmissionResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub student_id: StudentId,
    pub file_data: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub evaluation: Option<GradingDocument>,
    pub is_graded: bool,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            student_id: submission.student_id,
            file_data: submission.file_data,
            file_name: submission.file_name,
            submitted_at: submission.submitted_at,
            evaluation: submission.evaluation,
            is_graded: submission.is_graded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassroomRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassroomRequest {
    pub secret_code: String,
    pub student_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssignmentRequest {
    pub student_id: String,
    pub file_data: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvaluationRequest {
    pub evaluation: GradingDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub file_data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub classroom_id: String,
    pub assignment_id: String,
    pub submission_id: String,
    /// Start from an empty document instead of the stored evaluation.
    #[serde(default)]
    pub blank: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub classroom_id: String,
    pub assignment_id: String,
    pub submission_id: String,
    pub status: String,
    pub opened_at: DateTime<Utc>,
    pub document: GradingDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelGradingResponse {
    pub session_id: String,
    pub cancelled: bool,
}
