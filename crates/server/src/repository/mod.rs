mod assignment_repository;
mod classroom_repository;
mod submission_repository;

use homework_grader_core::domain::DomainError;
use sea_orm::DbErr;
use thiserror::Error;

pub use assignment_repository::{AssignmentRepository, SeaOrmAssignmentRepository};
pub use classroom_repository::{ClassroomRepository, SeaOrmClassroomRepository};
pub use submission_repository::{
    PublishedSubmission, SeaOrmSubmissionRepository, SubmissionKey, SubmissionRepository,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid row from database: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("failed to encode grading document: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
