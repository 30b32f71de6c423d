use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssignmentId, ClassroomId, DomainError, StudentId, Submission, TeacherId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JoinCode(String);

impl JoinCode {
    pub const LEN: usize = 6;
    const ALPHABET: &'static [u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    pub fn generate() -> Self {
        let code = Uuid::new_v4()
            .as_bytes()
            .iter()
            .take(Self::LEN)
            .map(|byte| char::from(Self::ALPHABET[usize::from(*byte) % Self::ALPHABET.len()]))
            .collect();
        Self(code)
    }

    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let code = input.trim().to_ascii_uppercase();

        if code.len() != Self::LEN || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidJoinCode(input.to_string()));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JoinCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JoinCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JoinCode> for String {
    fn from(value: JoinCode) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassroomName(String);

impl ClassroomName {
    pub const MAX_LEN: usize = 200;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        non_blank(value, Self::MAX_LEN, DomainError::EmptyClassroomName).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentTitle(String);

impl AssignmentTitle {
    pub const MAX_LEN: usize = 200;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        non_blank(value, Self::MAX_LEN, DomainError::EmptyAssignmentTitle).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_blank(
    value: impl Into<String>,
    max_len: usize,
    empty: DomainError,
) -> Result<String, DomainError> {
    let value = value.into();
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(empty);
    }

    Ok(trimmed.chars().take(max_len).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub submissions: Vec<Submission>,
}

impl Assignment {
    pub fn new(title: AssignmentTitle) -> Self {
        Self {
            id: AssignmentId::new(),
            title: title.0,
            created_at: Utc::now(),
            submissions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub teacher_id: TeacherId,
    pub secret_code: JoinCode,
    pub assignments: Vec<Assignment>,
    pub student_ids: Vec<StudentId>,
}

impl Classroom {
    pub fn new(name: ClassroomName, teacher_id: TeacherId) -> Self {
        Self {
            id: ClassroomId::new(),
            name: name.0,
            teacher_id,
            secret_code: JoinCode::generate(),
            assignments: Vec::new(),
            student_ids: Vec::new(),
        }
    }
}
