mod bilingual;
mod classroom;
mod editor;
mod error;
mod grading;
mod ids;
mod points;
mod producer;
mod score;
mod submission;

pub use bilingual::{BilingualText, Lang, TextValue};
pub use classroom::{Assignment, AssignmentTitle, Classroom, ClassroomName, JoinCode};
pub use editor::{EditOp, EditorDefaults, ErrorField, GradingEditor, ProblemField};
pub use error::DomainError;
pub use grading::{
    BoundingBox, ErrorRecord, ErrorType, GradingDocument, ProblemBreakdown, ValidationIssue,
    recompute_overall_score,
};
pub use ids::{AssignmentId, ClassroomId, StudentId, SubmissionId, TeacherId};
pub use points::Points;
pub use producer::{GradingProducer, GradingProducerError, GradingRequest};
pub use score::Score;
pub use submission::Submission;
