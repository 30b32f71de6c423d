use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use homework_grader_core::domain::{
    Assignment, Classroom, ClassroomId, ClassroomName, JoinCode, StudentId, TeacherId,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{info, warn};

use super::assignment_repository;
use super::{RepositoryError, Result};
use crate::entity::{classroom, classroom_student};

const MAX_JOIN_CODE_ATTEMPTS: usize = 8;

#[async_trait]
pub trait ClassroomRepository: Send + Sync {
    async fn create(&self, name: ClassroomName, teacher_id: TeacherId) -> Result<Classroom>;
    async fn list(&self) -> Result<Vec<Classroom>>;
    async fn find_by_id(&self, classroom_id: ClassroomId) -> Result<Option<Classroom>>;
    async fn join(&self, code: &JoinCode, student_id: StudentId) -> Result<Classroom>;
}

#[derive(Clone)]
pub struct SeaOrmClassroomRepository {
    db: DatabaseConnection,
}

impl SeaOrmClassroomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn code_taken(&self, code: &JoinCode) -> Result<bool> {
        let existing = classroom::Entity::find()
            .filter(classroom::Column::SecretCode.eq(code.as_str()))
            .one(&self.db)
            .await?;
        Ok(existing.is_some())
    }
}

fn map_model(
    model: classroom::Model,
    student_ids: Vec<StudentId>,
    assignments: Vec<Assignment>,
) -> Result<Classroom> {
    let id = ClassroomId::from_str(&model.id).map_err(|e| {
        RepositoryError::Corrupt(format!("invalid classroom.id '{}': {e}", model.id))
    })?;
    let teacher_id = TeacherId::new(model.teacher_id.as_str()).map_err(|e| {
        RepositoryError::Corrupt(format!(
            "invalid classroom.teacher_id '{}': {e}",
            model.teacher_id
        ))
    })?;
    let secret_code = JoinCode::parse(&model.secret_code).map_err(|e| {
        RepositoryError::Corrupt(format!(
            "invalid classroom.secret_code '{}': {e}",
            model.secret_code
        ))
    })?;

    Ok(Classroom {
        id,
        name: model.name,
        teacher_id,
        secret_code,
        assignments,
        student_ids,
    })
}

async fn load_classrooms<C: ConnectionTrait>(
    conn: &C,
    models: Vec<classroom::Model>,
) -> Result<Vec<Classroom>> {
    let classroom_ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();

    let mut students: HashMap<String, Vec<StudentId>> = HashMap::new();
    let enrollments = classroom_student::Entity::find()
        .filter(classroom_student::Column::ClassroomId.is_in(classroom_ids.clone()))
        .order_by_asc(classroom_student::Column::JoinedAt)
        .all(conn)
        .await?;
    for enrollment in enrollments {
        let student_id = StudentId::new(enrollment.student_id.as_str()).map_err(|e| {
            RepositoryError::Corrupt(format!(
                "invalid classroom_student.student_id '{}': {e}",
                enrollment.student_id
            ))
        })?;
        students
            .entry(enrollment.classroom_id)
            .or_default()
            .push(student_id);
    }

    let mut assignments = assignment_repository::load_by_classrooms(conn, classroom_ids).await?;

    models
        .into_iter()
        .map(|model| {
            let student_ids = students.remove(&model.id).unwrap_or_default();
            let assignments = assignments.remove(&model.id).unwrap_or_default();
            map_model(model, student_ids, assignments)
        })
        .collect()
}

#[async_trait]
impl ClassroomRepository for SeaOrmClassroomRepository {
    async fn create(&self, name: ClassroomName, teacher_id: TeacherId) -> Result<Classroom> {
        for attempt in 1..=MAX_JOIN_CODE_ATTEMPTS {
            let classroom = Classroom::new(name.clone(), teacher_id.clone());
            if self.code_taken(&classroom.secret_code).await? {
                warn!(attempt, "join code collision, regenerating");
                continue;
            }

            let active_model = classroom::ActiveModel {
                id: Set(classroom.id.to_string()),
                name: Set(classroom.name.clone()),
                teacher_id: Set(classroom.teacher_id.to_string()),
                secret_code: Set(classroom.secret_code.to_string()),
                created_at: Set(Utc::now().naive_utc()),
            };
            active_model.insert(&self.db).await?;

            info!(classroom_id = %classroom.id, "created classroom");
            return Ok(classroom);
        }

        Err(RepositoryError::Conflict(
            "could not allocate a unique join code".to_string(),
        ))
    }

    async fn list(&self) -> Result<Vec<Classroom>> {
        let models = classroom::Entity::find()
            .order_by_asc(classroom::Column::CreatedAt)
            .all(&self.db)
            .await?;

        load_classrooms(&self.db, models).await
    }

    async fn find_by_id(&self, classroom_id: ClassroomId) -> Result<Option<Classroom>> {
        let Some(model) = classroom::Entity::find_by_id(classroom_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(load_classrooms(&self.db, vec![model]).await?.pop())
    }

    async fn join(&self, code: &JoinCode, student_id: StudentId) -> Result<Classroom> {
        let model = classroom::Entity::find()
            .filter(classroom::Column::SecretCode.eq(code.as_str()))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("classroom", code))?;

        let enrolled = classroom_student::Entity::find_by_id((
            model.id.clone(),
            student_id.to_string(),
        ))
        .one(&self.db)
        .await?;
        if enrolled.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "student {student_id} already joined classroom {}",
                model.id
            )));
        }

        let active_model = classroom_student::ActiveModel {
            classroom_id: Set(model.id.clone()),
            student_id: Set(student_id.to_string()),
            joined_at: Set(Utc::now().naive_utc()),
        };
        active_model.insert(&self.db).await?;

        info!(classroom_id = %model.id, %student_id, "student joined classroom");

        load_classrooms(&self.db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::Corrupt("joined classroom vanished".to_string()))
    }
}
