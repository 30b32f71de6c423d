//! 班级与作业 API 路由。

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use homework_grader_api_types::{
    AssignmentResponse, ClassroomResponse, CreateAssignmentRequest, CreateClassroomRequest,
    JoinClassroomRequest,
};
use homework_grader_core::domain::{
    AssignmentTitle, ClassroomId, ClassroomName, JoinCode, StudentId, TeacherId,
};
use tracing::info;

use super::{ApiError, AppState, parse_id};

/// 创建班级 API 路由。
pub fn create_classroom_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/classrooms", get(list_classrooms).post(create_classroom))
        .route("/api/classrooms/join", post(join_classroom))
        .route("/api/classrooms/{classroom_id}", get(get_classroom))
        .route(
            "/api/classrooms/{classroom_id}/assignments",
            get(list_assignments).post(create_assignment),
        )
}

/// 列出全部班级（含作业、提交与学生）。
async fn list_classrooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClassroomResponse>>, ApiError> {
    let classrooms = state.classrooms.list().await?;
    Ok(Json(
        classrooms.into_iter().map(ClassroomResponse::from).collect(),
    ))
}

/// 创建班级，教师身份固定为占位教师。
async fn create_classroom(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateClassroomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClassroomResponse>), ApiError> {
    let Json(request) = payload?;
    let name = ClassroomName::new(request.name)?;

    let classroom = state
        .classrooms
        .create(name, TeacherId::placeholder())
        .await?;
    Ok((StatusCode::CREATED, Json(classroom.into())))
}

/// 查询单个班级。
async fn get_classroom(
    State(state): State<Arc<AppState>>,
    Path(classroom_id): Path<String>,
) -> Result<Json<ClassroomResponse>, ApiError> {
    let classroom_id: ClassroomId = parse_id("classroom", &classroom_id)?;
    let classroom = state
        .classrooms
        .find_by_id(classroom_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("classroom not found: {classroom_id}")))?;
    Ok(Json(classroom.into()))
}

/// 学生通过邀请码加入班级。
async fn join_classroom(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<JoinClassroomRequest>, JsonRejection>,
) -> Result<Json<ClassroomResponse>, ApiError> {
    let Json(request) = payload?;
    if request.secret_code.trim().is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_INPUT",
            "secret code is required",
        ));
    }
    let student_id = StudentId::new(request.student_id)?;
    // A malformed code can never match a classroom.
    let code = JoinCode::parse(&request.secret_code)
        .map_err(|_| ApiError::not_found("invalid classroom code"))?;

    let classroom = state.classrooms.join(&code, student_id).await?;
    Ok(Json(classroom.into()))
}

/// 列出班级下的作业。
async fn list_assignments(
    State(state): State<Arc<AppState>>,
    Path(classroom_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let classroom_id: ClassroomId = parse_id("classroom", &classroom_id)?;
    if state.classrooms.find_by_id(classroom_id).await?.is_none() {
        return Err(ApiError::not_found(format!(
            "classroom not found: {classroom_id}"
        )));
    }

    let assignments = state.assignments.list_by_classroom(classroom_id).await?;
    Ok(Json(
        assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect(),
    ))
}

/// 在班级下创建作业。
async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Path(classroom_id): Path<String>,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let classroom_id: ClassroomId = parse_id("classroom", &classroom_id)?;
    let Json(request) = payload?;
    let title = AssignmentTitle::new(request.title)?;

    let assignment = state.assignments.create(classroom_id, title).await?;
    info!(%classroom_id, assignment_id = %assignment.id, "created assignment");
    Ok((StatusCode::CREATED, Json(assignment.into())))
}
