use chrono::{DateTime, Utc};

use super::{DomainError, GradingDocument, Score, StudentId, SubmissionId, ValidationIssue};

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: SubmissionId,
    pub student_id: StudentId,
    pub file_data: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub evaluation: Option<GradingDocument>,
    pub is_graded: bool,
}

impl Submission {
    pub fn new(
        student_id: StudentId,
        file_data: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            student_id,
            file_data: file_data.into(),
            file_name: file_name.into(),
            submitted_at: Utc::now(),
            evaluation: None,
            is_graded: false,
        }
    }

    pub fn publish(
        &mut self,
        document: GradingDocument,
    ) -> Result<(Score, Vec<ValidationIssue>), DomainError> {
        let score = Score::new(document.overall_score)?;
        let issues = document
            .validation_issues()
            .into_iter()
            .filter(|issue| !matches!(issue, ValidationIssue::OverallScoreOutOfRange(_)))
            .collect();

        self.evaluation = Some(document);
        self.is_graded = true;
        Ok((score, issues))
    }
}
