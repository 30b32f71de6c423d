use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use homework_grader_core::domain::{Assignment, AssignmentId, AssignmentTitle, ClassroomId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};

use super::submission_repository;
use super::{RepositoryError, Result};
use crate::entity::{assignment, classroom};

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(
        &self,
        classroom_id: ClassroomId,
        title: AssignmentTitle,
    ) -> Result<Assignment>;
    async fn list_by_classroom(&self, classroom_id: ClassroomId) -> Result<Vec<Assignment>>;
}

#[derive(Clone)]
pub struct SeaOrmAssignmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmAssignmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn require_assignment<C: ConnectionTrait>(
    conn: &C,
    classroom_id: ClassroomId,
    assignment_id: AssignmentId,
) -> Result<assignment::Model> {
    classroom::Entity::find_by_id(classroom_id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::not_found("classroom", classroom_id))?;

    assignment::Entity::find_by_id(assignment_id.to_string())
        .filter(assignment::Column::ClassroomId.eq(classroom_id.to_string()))
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::not_found("assignment", assignment_id))
}

fn map_model(model: assignment::Model) -> Result<Assignment> {
    let id = AssignmentId::from_str(&model.id).map_err(|e| {
        RepositoryError::Corrupt(format!("invalid assignment.id '{}': {e}", model.id))
    })?;

    Ok(Assignment {
        id,
        title: model.title,
        created_at: model.created_at.and_utc(),
        submissions: Vec::new(),
    })
}

pub(crate) async fn load_by_classrooms<C: ConnectionTrait>(
    conn: &C,
    classroom_ids: Vec<String>,
) -> Result<HashMap<String, Vec<Assignment>>> {
    let models = assignment::Entity::find()
        .filter(assignment::Column::ClassroomId.is_in(classroom_ids))
        .order_by_asc(assignment::Column::CreatedAt)
        .all(conn)
        .await?;

    let assignment_ids = models.iter().map(|model| model.id.clone()).collect();
    let mut submissions: HashMap<String, Vec<_>> = HashMap::new();
    for model in submission_repository::list_models(conn, assignment_ids).await? {
        let assignment_id = model.assignment_id.clone();
        submissions
            .entry(assignment_id)
            .or_default()
            .push(submission_repository::map_model(model)?);
    }

    let mut by_classroom: HashMap<String, Vec<Assignment>> = HashMap::new();
    for model in models {
        let classroom_id = model.classroom_id.clone();
        let mut assignment = map_model(model)?;
        assignment.submissions = submissions
            .remove(&assignment.id.to_string())
            .unwrap_or_default();
        by_classroom.entry(classroom_id).or_default().push(assignment);
    }

    Ok(by_classroom)
}

#[async_trait]
impl AssignmentRepository for SeaOrmAssignmentRepository {
    async fn create(
        &self,
        classroom_id: ClassroomId,
        title: AssignmentTitle,
    ) -> Result<Assignment> {
        classroom::Entity::find_by_id(classroom_id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found("classroom", classroom_id))?;

        let assignment = Assignment::new(title);
        let active_model = assignment::ActiveModel {
            id: Set(assignment.id.to_string()),
            classroom_id: Set(classroom_id.to_string()),
            title: Set(assignment.title.clone()),
            created_at: Set(assignment.created_at.naive_utc()),
        };

        let model = active_model.insert(&self.db).await?;
        map_model(model)
    }

    async fn list_by_classroom(&self, classroom_id: ClassroomId) -> Result<Vec<Assignment>> {
        let mut by_classroom = load_by_classrooms(&self.db, vec![classroom_id.to_string()]).await?;
        Ok(by_classroom
            .remove(&classroom_id.to_string())
            .unwrap_or_default())
    }
}
