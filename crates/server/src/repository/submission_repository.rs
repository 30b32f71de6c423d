use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use homework_grader_core::domain::{
    AssignmentId, ClassroomId, GradingDocument, Score, StudentId, Submission, SubmissionId,
    ValidationIssue,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::info;

use super::assignment_repository::require_assignment;
use super::{RepositoryError, Result};
use crate::entity::submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionKey {
    pub classroom_id: ClassroomId,
    pub assignment_id: AssignmentId,
    pub submission_id: SubmissionId,
}

#[derive(Debug, Clone)]
pub struct PublishedSubmission {
    pub submission: Submission,
    pub score: Score,
    pub issues: Vec<ValidationIssue>,
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn submit(
        &self,
        classroom_id: ClassroomId,
        assignment_id: AssignmentId,
        submission: Submission,
    ) -> Result<Submission>;
    async fn find(&self, key: SubmissionKey) -> Result<Submission>;
    async fn list_by_assignment(
        &self,
        classroom_id: ClassroomId,
        assignment_id: AssignmentId,
    ) -> Result<Vec<Submission>>;
    async fn publish(
        &self,
        key: SubmissionKey,
        document: GradingDocument,
    ) -> Result<PublishedSubmission>;
}

#[derive(Clone)]
pub struct SeaOrmSubmissionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubmissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model<C: ConnectionTrait>(
        conn: &C,
        key: SubmissionKey,
    ) -> Result<submission::Model> {
        require_assignment(conn, key.classroom_id, key.assignment_id).await?;

        submission::Entity::find_by_id(key.submission_id.to_string())
            .filter(submission::Column::AssignmentId.eq(key.assignment_id.to_string()))
            .one(conn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("submission", key.submission_id))
    }
}

pub(crate) fn map_model(model: submission::Model) -> Result<Submission> {
    let id = SubmissionId::from_str(&model.id).map_err(|e| {
        RepositoryError::Corrupt(format!("invalid submission.id '{}': {e}", model.id))
    })?;
    let student_id = StudentId::new(model.student_id.as_str()).map_err(|e| {
        RepositoryError::Corrupt(format!(
            "invalid submission.student_id '{}': {e}",
            model.student_id
        ))
    })?;
    let evaluation = model
        .evaluation
        .as_deref()
        .map(serde_json::from_str::<GradingDocument>)
        .transpose()
        .map_err(|e| {
            RepositoryError::Corrupt(format!(
                "invalid submission.evaluation for '{}': {e}",
                model.id
            ))
        })?;

    Ok(Submission {
        id,
        student_id,
        file_data: model.file_data,
        file_name: model.file_name,
        submitted_at: model.submitted_at.and_utc(),
        evaluation,
        is_graded: model.is_graded,
    })
}

pub(crate) async fn list_models<C: ConnectionTrait>(
    conn: &C,
    assignment_ids: Vec<String>,
) -> Result<Vec<submission::Model>> {
    Ok(submission::Entity::find()
        .filter(submission::Column::AssignmentId.is_in(assignment_ids))
        .order_by_asc(submission::Column::SubmittedAt)
        .all(conn)
        .await?)
}

#[async_trait]
impl SubmissionRepository for SeaOrmSubmissionRepository {
    async fn submit(
        &self,
        classroom_id: ClassroomId,
        assignment_id: AssignmentId,
        submission: Submission,
    ) -> Result<Submission> {
        let txn = self.db.begin().await?;
        require_assignment(&txn, classroom_id, assignment_id).await?;

        let replaced = submission::Entity::delete_many()
            .filter(submission::Column::AssignmentId.eq(assignment_id.to_string()))
            .filter(submission::Column::StudentId.eq(submission.student_id.as_str()))
            .exec(&txn)
            .await?;

        let evaluation = submission
            .evaluation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let active_model = submission::ActiveModel {
            id: Set(submission.id.to_string()),
            assignment_id: Set(assignment_id.to_string()),
            student_id: Set(submission.student_id.to_string()),
            file_data: Set(submission.file_data),
            file_name: Set(submission.file_name),
            evaluation: Set(evaluation),
            overall_score: Set(None),
            is_graded: Set(submission.is_graded),
            submitted_at: Set(submission.submitted_at.naive_utc()),
            updated_at: Set(Utc::now().naive_utc()),
        };

        let model = active_model.insert(&txn).await?;
        txn.commit().await?;

        if replaced.rows_affected > 0 {
            info!(
                %assignment_id,
                student_id = %model.student_id,
                "replaced previous submission"
            );
        }

        map_model(model)
    }

    async fn find(&self, key: SubmissionKey) -> Result<Submission> {
        let model = Self::find_model(&self.db, key).await?;
        map_model(model)
    }

    async fn list_by_assignment(
        &self,
        classroom_id: ClassroomId,
        assignment_id: AssignmentId,
    ) -> Result<Vec<Submission>> {
        require_assignment(&self.db, classroom_id, assignment_id).await?;

        list_models(&self.db, vec![assignment_id.to_string()])
            .await?
            .into_iter()
            .map(map_model)
            .collect()
    }

    async fn publish(
        &self,
        key: SubmissionKey,
        document: GradingDocument,
    ) -> Result<PublishedSubmission> {
        let txn = self.db.begin().await?;
        let model = Self::find_model(&txn, key).await?;

        let mut submission = map_model(model.clone())?;
        let (score, issues) = submission.publish(document)?;
        let evaluation = submission
            .evaluation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let overall_score = i16::try_from(u16::from(score)).map_err(|_| {
            RepositoryError::Corrupt(format!(
                "overall score {} does not fit the column",
                score.value()
            ))
        })?;

        let mut active_model: submission::ActiveModel = model.into();
        active_model.evaluation = Set(evaluation);
        active_model.overall_score = Set(Some(overall_score));
        active_model.is_graded = Set(true);
        active_model.updated_at = Set(Utc::now().naive_utc());

        let updated = active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(PublishedSubmission {
            submission: map_model(updated)?,
            score,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> submission::Model {
        let now = Utc::now().naive_utc();
        submission::Model {
            id: SubmissionId::new().to_string(),
            assignment_id: AssignmentId::new().to_string(),
            student_id: "student-01".to_string(),
            file_data: "aGVsbG8=".to_string(),
            file_name: "hw.jpg".to_string(),
            evaluation: None,
            overall_score: None,
            is_graded: false,
            submitted_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn map_model_parses_stored_evaluation() {
        let mut row = model();
        row.evaluation = Some(r#"{"overall_score":80,"problem_breakdown":[]}"#.to_string());
        row.is_graded = true;

        let submission = map_model(row).expect("row should map");
        assert_eq!(
            submission.evaluation.map(|doc| doc.overall_score),
            Some(80)
        );
        assert!(submission.is_graded);
    }

    #[test]
    fn map_model_rejects_corrupt_rows() {
        let mut row = model();
        row.evaluation = Some("not json".to_string());
        assert!(matches!(map_model(row), Err(RepositoryError::Corrupt(_))));

        let mut row = model();
        row.id = "nope".to_string();
        assert!(matches!(map_model(row), Err(RepositoryError::Corrupt(_))));
    }
}
