use serde::{Deserialize, Serialize};

use super::{
    BilingualText, BoundingBox, DomainError, ErrorRecord, ErrorType, GradingDocument, Points,
    ProblemBreakdown, Score, TextValue, recompute_overall_score,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProblemField {
    ProblemDescription(TextValue),
    Score(Points),
    MaxScore(Points),
    Feedback(TextValue),
    TeacherRecommendation(TextValue),
}

impl ProblemField {
    pub fn affects_score(&self) -> bool {
        matches!(self, Self::Score(_) | Self::MaxScore(_))
    }

    fn apply_to(self, problem: &mut ProblemBreakdown) {
        match self {
            Self::ProblemDescription(text) => problem.problem_description.apply(text),
            Self::Score(points) => problem.score = points.value(),
            Self::MaxScore(points) => problem.max_score = points.value(),
            Self::Feedback(text) => problem.feedback.apply(text),
            Self::TeacherRecommendation(text) => problem.teacher_recommendation.apply(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ErrorField {
    ErrorType(ErrorType),
    Deduction(Points),
    Explanation(TextValue),
    Hint(TextValue),
    BoundingBox(BoundingBox),
}

impl ErrorField {
    fn apply_to(self, error: &mut ErrorRecord) {
        match self {
            Self::ErrorType(error_type) => error.error_type = error_type,
            Self::Deduction(points) => error.deduction = points.value(),
            Self::Explanation(text) => error.explanation.apply(text),
            Self::Hint(text) => error.hint.apply(text),
            Self::BoundingBox(bounding_box) => error.bounding_box = bounding_box,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    SetProblemField {
        problem_index: usize,
        edit: ProblemField,
    },
    SetErrorField {
        problem_index: usize,
        error_index: usize,
        edit: ErrorField,
    },
    AddError {
        problem_index: usize,
    },
    RemoveError {
        problem_index: usize,
        error_index: usize,
    },
    AddProblem,
    SetOverallScore {
        score: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorDefaults {
    pub max_score: i64,
    pub error: ErrorRecord,
}

impl EditorDefaults {
    pub const MAX_SCORE: i64 = 25;

    pub fn with_max_score(max_score: i64) -> Self {
        Self {
            max_score,
            ..Self::default()
        }
    }

    pub fn placeholder_error() -> ErrorRecord {
        ErrorRecord {
            error_type: ErrorType::MinorSlip,
            deduction: 1,
            explanation: BilingualText::new("New error explanation.", "הסבר שגיאה חדש."),
            hint: BilingualText::new("New hint.", "רמז חדש."),
            bounding_box: BoundingBox::new(0.0, 0.0, 0.1, 0.1),
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            max_score: Self::MAX_SCORE,
            error: Self::placeholder_error(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradingEditor {
    document: GradingDocument,
    defaults: EditorDefaults,
}

impl GradingEditor {
    pub fn new(document: GradingDocument, defaults: EditorDefaults) -> Self {
        Self { document, defaults }
    }

    pub fn blank(defaults: EditorDefaults) -> Self {
        Self::new(GradingDocument::default(), defaults)
    }

    pub fn document(&self) -> &GradingDocument {
        &self.document
    }

    pub fn replace_document(&mut self, document: GradingDocument) -> GradingDocument {
        std::mem::replace(&mut self.document, document)
    }

    pub fn apply(&mut self, op: EditOp) -> Result<(), DomainError> {
        match op {
            EditOp::SetProblemField {
                problem_index,
                edit,
            } => self.set_problem_field(problem_index, edit),
            EditOp::SetErrorField {
                problem_index,
                error_index,
                edit,
            } => self.set_error_field(problem_index, error_index, edit),
            EditOp::AddError { problem_index } => self.add_error(problem_index),
            EditOp::RemoveError {
                problem_index,
                error_index,
            } => self.remove_error(problem_index, error_index).map(|_| ()),
            EditOp::AddProblem => {
                self.add_problem();
                Ok(())
            }
            EditOp::SetOverallScore { score } => self.set_overall_score(score),
        }
    }

    pub fn set_problem_field(
        &mut self,
        problem_index: usize,
        field: ProblemField,
    ) -> Result<(), DomainError> {
        let recompute = field.affects_score();
        field.apply_to(self.problem_mut(problem_index)?);

        if recompute {
            self.recompute();
        }
        Ok(())
    }

    pub fn set_error_field(
        &mut self,
        problem_index: usize,
        error_index: usize,
        field: ErrorField,
    ) -> Result<(), DomainError> {
        field.apply_to(self.error_mut(problem_index, error_index)?);
        Ok(())
    }

    pub fn add_error(&mut self, problem_index: usize) -> Result<(), DomainError> {
        let error = self.defaults.error.clone();
        self.problem_mut(problem_index)?.errors.push(error);
        Ok(())
    }

    pub fn remove_error(
        &mut self,
        problem_index: usize,
        error_index: usize,
    ) -> Result<ErrorRecord, DomainError> {
        self.error_mut(problem_index, error_index)?;
        Ok(self.document.problem_breakdown[problem_index]
            .errors
            .remove(error_index))
    }

    pub fn add_problem(&mut self) -> usize {
        self.document
            .problem_breakdown
            .push(ProblemBreakdown::empty(self.defaults.max_score));
        self.recompute();
        self.document.problem_breakdown.len() - 1
    }

    pub fn set_overall_score(&mut self, score: i64) -> Result<(), DomainError> {
        let score = Score::new(score)?;
        self.document.overall_score = i64::from(score);
        Ok(())
    }

    fn recompute(&mut self) {
        self.document.overall_score = recompute_overall_score(&self.document.problem_breakdown);
    }

    fn problem_mut(&mut self, problem_index: usize) -> Result<&mut ProblemBreakdown, DomainError> {
        let len = self.document.problem_breakdown.len();
        self.document
            .problem_breakdown
            .get_mut(problem_index)
            .ok_or(DomainError::ProblemIndexOutOfRange {
                index: problem_index,
                len,
            })
    }

    fn error_mut(
        &mut self,
        problem_index: usize,
        error_index: usize,
    ) -> Result<&mut ErrorRecord, DomainError> {
        let problem = self.problem_mut(problem_index)?;
        let len = problem.errors.len();
        problem
            .errors
            .get_mut(error_index)
            .ok_or(DomainError::ErrorIndexOutOfRange {
                problem_index,
                index: error_index,
                len,
            })
    }
}

impl From<GradingDocument> for GradingEditor {
    fn from(document: GradingDocument) -> Self {
        Self::new(document, EditorDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Lang;

    fn problem(score: i64, max_score: i64) -> ProblemBreakdown {
        ProblemBreakdown {
            problem_description: BilingualText::new("Question", "שאלה"),
            score,
            max_score,
            ..ProblemBreakdown::default()
        }
    }

    fn two_problem_editor() -> GradingEditor {
        let mut first = problem(20, 25);
        first.errors.push(EditorDefaults::placeholder_error());
        GradingEditor::from(GradingDocument::from_problems(vec![first, problem(15, 25)]))
    }

    #[test]
    fn score_edit_recomputes_overall() {
        let mut editor = two_problem_editor();
        assert_eq!(editor.document().overall_score, 70);

        editor
            .set_problem_field(1, ProblemField::Score(Points(25)))
            .expect("index should be valid");

        assert_eq!(editor.document().overall_score, 90);
    }

    #[test]
    fn max_score_edit_recomputes_overall() {
        let mut editor = two_problem_editor();
        editor
            .set_problem_field(0, ProblemField::MaxScore(Points(45)))
            .expect("index should be valid");

        // 35 / 70
        assert_eq!(editor.document().overall_score, 50);
    }

    #[test]
    fn override_survives_text_and_error_edits() {
        let mut editor = two_problem_editor();
        editor.set_overall_score(77).expect("77 is in range");

        editor
            .set_problem_field(
                0,
                ProblemField::Feedback(TextValue::Slot { lang: Lang::En, text: "Nice work".to_string() }),
            )
            .expect("index should be valid");
        editor
            .set_error_field(0, 0, ErrorField::Deduction(Points(3)))
            .expect("indices should be valid");
        editor.add_error(1).expect("index should be valid");
        editor.remove_error(0, 0).expect("indices should be valid");

        assert_eq!(editor.document().overall_score, 77);
        assert!(editor.document().is_overridden());
    }

    #[test]
    fn override_is_clobbered_by_next_score_edit() {
        let mut editor = two_problem_editor();
        editor.set_overall_score(77).expect("77 is in range");
        assert_eq!(editor.document().overall_score, 77);

        editor
            .set_problem_field(0, ProblemField::Score(Points(20)))
            .expect("index should be valid");

        assert_eq!(editor.document().overall_score, 70);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let mut editor = two_problem_editor();
        let before = editor.clone();

        assert_eq!(
            editor.set_overall_score(150),
            Err(DomainError::InvalidScore(150))
        );
        assert_eq!(
            editor.set_overall_score(-5),
            Err(DomainError::InvalidScore(-5))
        );
        assert_eq!(editor, before);
    }

    #[test]
    fn add_problem_uses_defaults_and_recomputes() {
        let mut editor = two_problem_editor();
        let index = editor.add_problem();

        let added = &editor.document().problem_breakdown[index];
        assert_eq!(index, 2);
        assert_eq!(added.score, 0);
        assert_eq!(added.max_score, EditorDefaults::MAX_SCORE);
        assert!(added.errors.is_empty());
        assert_eq!(added.feedback, BilingualText::default());
        // 35 / 75
        assert_eq!(editor.document().overall_score, 47);
    }

    #[test]
    fn add_problem_to_blank_document() {
        let mut editor = GradingEditor::blank(EditorDefaults::with_max_score(10));
        editor.add_problem();

        assert_eq!(editor.document().problem_breakdown.len(), 1);
        assert_eq!(editor.document().problem_breakdown[0].max_score, 10);
        assert_eq!(editor.document().overall_score, 0);
    }

    #[test]
    fn add_problem_clobbers_override() {
        let mut editor = two_problem_editor();
        editor.set_overall_score(99).expect("99 is in range");
        editor.add_problem();

        assert_eq!(editor.document().overall_score, 47);
    }

    #[test]
    fn remove_then_add_error_restores_length_with_defaults() {
        let mut editor = two_problem_editor();
        editor
            .set_error_field(
                0,
                0,
                ErrorField::ErrorType(ErrorType::ConceptualError),
            )
            .expect("indices should be valid");
        let before = editor.document().problem_breakdown[0].errors.len();

        let removed = editor.remove_error(0, 0).expect("indices should be valid");
        editor.add_error(0).expect("index should be valid");

        let errors = &editor.document().problem_breakdown[0].errors;
        assert_eq!(removed.error_type, ErrorType::ConceptualError);
        assert_eq!(errors.len(), before);
        assert_eq!(errors[0], EditorDefaults::placeholder_error());
    }

    #[test]
    fn remove_error_preserves_order() {
        let mut editor = two_problem_editor();
        for deduction in [2, 3] {
            editor.add_error(0).expect("index should be valid");
            let last = editor.document().problem_breakdown[0].errors.len() - 1;
            editor
                .set_error_field(0, last, ErrorField::Deduction(Points(deduction)))
                .expect("indices should be valid");
        }

        editor.remove_error(0, 1).expect("indices should be valid");

        let deductions: Vec<i64> = editor.document().problem_breakdown[0]
            .errors
            .iter()
            .map(|error| error.deduction)
            .collect();
        assert_eq!(deductions, vec![1, 3]);
    }

    #[test]
    fn invalid_indices_leave_document_unchanged() {
        let mut editor = two_problem_editor();
        let before = editor.clone();

        let err = editor
            .set_problem_field(5, ProblemField::Score(Points(1)))
            .expect_err("problem 5 does not exist");
        assert_eq!(err, DomainError::ProblemIndexOutOfRange { index: 5, len: 2 });

        let err = editor
            .remove_error(1, 0)
            .expect_err("problem 1 has no errors");
        assert_eq!(
            err,
            DomainError::ErrorIndexOutOfRange {
                problem_index: 1,
                index: 0,
                len: 0,
            }
        );

        assert!(editor.add_error(2).is_err());
        assert!(
            editor
                .set_error_field(0, 3, ErrorField::Hint(TextValue::Slot { lang: Lang::He, text: "x".to_string() }))
                .is_err()
        );
        assert_eq!(editor, before);
    }

    #[test]
    fn bilingual_slot_edit_keeps_other_slot() {
        let mut editor = two_problem_editor();
        editor
            .set_problem_field(
                0,
                ProblemField::ProblemDescription(TextValue::Slot { lang: Lang::He, text: "שאלה 1".to_string() }),
            )
            .expect("index should be valid");

        let description = &editor.document().problem_breakdown[0].problem_description;
        assert_eq!(description.en, "Question");
        assert_eq!(description.he, "שאלה 1");
        assert_eq!(editor.document().overall_score, 70);
    }

    #[test]
    fn text_edit_does_not_recompute_inconsistent_total() {
        let mut document = GradingDocument::from_problems(vec![problem(10, 20)]);
        document.overall_score = 12;
        let mut editor = GradingEditor::from(document);

        editor
            .set_problem_field(
                0,
                ProblemField::TeacherRecommendation(TextValue::Slot { lang: Lang::En, text: "Practice".to_string() }),
            )
            .expect("index should be valid");

        assert_eq!(editor.document().overall_score, 12);
    }

    #[test]
    fn edit_ops_deserialize_from_tagged_json() {
        let op: EditOp = serde_json::from_str(
            r#"{"op":"set_problem_field","problem_index":1,"edit":{"field":"score","value":"25"}}"#,
        )
        .expect("op should parse");
        assert_eq!(
            op,
            EditOp::SetProblemField {
                problem_index: 1,
                edit: ProblemField::Score(Points(25)),
            }
        );

        let op: EditOp = serde_json::from_str(
            r#"{"op":"set_error_field","problem_index":0,"error_index":0,
                "edit":{"field":"explanation","value":{"lang":"en","text":"sign error"}}}"#,
        )
        .expect("op should parse");
        assert!(matches!(op, EditOp::SetErrorField { problem_index: 0, error_index: 0, .. }));

        let op: EditOp = serde_json::from_str(r#"{"op":"add_problem"}"#).expect("op should parse");
        assert_eq!(op, EditOp::AddProblem);
    }

    #[test]
    fn apply_dispatches_scenario() {
        let mut editor = two_problem_editor();
        let ops = vec![
            EditOp::SetOverallScore { score: 77 },
            EditOp::AddError { problem_index: 1 },
            EditOp::SetProblemField {
                problem_index: 1,
                edit: ProblemField::Score(Points(25)),
            },
        ];

        for op in ops {
            editor.apply(op).expect("op should apply");
        }

        assert_eq!(editor.document().overall_score, 90);
        assert_eq!(editor.document().problem_breakdown[1].errors.len(), 1);
    }
}
