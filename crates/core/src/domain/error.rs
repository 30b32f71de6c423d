use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid score: {0}. score must be in [0, 100]")]
    InvalidScore(i64),
    #[error("problem index {index} is out of range (problem count: {len})")]
    ProblemIndexOutOfRange { index: usize, len: usize },
    #[error("error index {index} is out of range for problem {problem_index} (error count: {len})")]
    ErrorIndexOutOfRange {
        problem_index: usize,
        index: usize,
        len: usize,
    },
    #[error("classroom name must not be empty")]
    EmptyClassroomName,
    #[error("assignment title must not be empty")]
    EmptyAssignmentTitle,
    #[error("participant id must not be empty")]
    EmptyParticipantId,
    #[error("invalid join code: {0}")]
    InvalidJoinCode(String),
}
