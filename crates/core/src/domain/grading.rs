use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BilingualText;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    #[default]
    MinorSlip,
    ProceduralError,
    ConceptualError,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_normalized(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| (0.0..=1.0).contains(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error_type: ErrorType,
    pub deduction: i64,
    pub explanation: BilingualText,
    pub hint: BilingualText,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemBreakdown {
    pub problem_description: BilingualText,
    pub score: i64,
    pub max_score: i64,
    pub feedback: BilingualText,
    pub teacher_recommendation: BilingualText,
    pub errors: Vec<ErrorRecord>,
}

impl ProblemBreakdown {
    pub fn empty(max_score: i64) -> Self {
        Self {
            max_score,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingDocument {
    pub overall_score: i64,
    pub problem_breakdown: Vec<ProblemBreakdown>,
}

impl GradingDocument {
    pub fn from_problems(problem_breakdown: Vec<ProblemBreakdown>) -> Self {
        Self {
            overall_score: recompute_overall_score(&problem_breakdown),
            problem_breakdown,
        }
    }

    pub fn derived_score(&self) -> i64 {
        recompute_overall_score(&self.problem_breakdown)
    }

    pub fn is_overridden(&self) -> bool {
        self.overall_score != self.derived_score()
    }

    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !(0..=100).contains(&self.overall_score) {
            issues.push(ValidationIssue::OverallScoreOutOfRange(self.overall_score));
        }

        for (problem_index, problem) in self.problem_breakdown.iter().enumerate() {
            if problem.max_score < 0 {
                issues.push(ValidationIssue::NegativeMaxScore {
                    problem_index,
                    max_score: problem.max_score,
                });
            } else if !(0..=problem.max_score).contains(&problem.score) {
                issues.push(ValidationIssue::ScoreOutOfRange {
                    problem_index,
                    score: problem.score,
                    max_score: problem.max_score,
                });
            }

            for (error_index, error) in problem.errors.iter().enumerate() {
                if !error.bounding_box.is_normalized() {
                    issues.push(ValidationIssue::BoundingBoxOutOfRange {
                        problem_index,
                        error_index,
                    });
                }
            }
        }

        issues
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("overall score {0} is outside [0, 100]")]
    OverallScoreOutOfRange(i64),
    #[error("problem {problem_index}: max score {max_score} is negative")]
    NegativeMaxScore { problem_index: usize, max_score: i64 },
    #[error("problem {problem_index}: score {score} is outside [0, {max_score}]")]
    ScoreOutOfRange {
        problem_index: usize,
        score: i64,
        max_score: i64,
    },
    #[error("problem {problem_index}, error {error_index}: bounding box is not normalized")]
    BoundingBoxOutOfRange {
        problem_index: usize,
        error_index: usize,
    },
}

/// Percentage of earned points, rounded half away from zero; `0` without positive max.
pub fn recompute_overall_score(problems: &[ProblemBreakdown]) -> i64 {
    let (total, max) = problems.iter().fold((0i128, 0i128), |(total, max), problem| {
        (
            total + i128::from(problem.score),
            max + i128::from(problem.max_score),
        )
    });

    if max <= 0 {
        return 0;
    }

    let numerator = 100 * total;
    let rounded = if numerator >= 0 {
        (2 * numerator + max) / (2 * max)
    } else {
        -((-2 * numerator + max) / (2 * max))
    };

    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}
