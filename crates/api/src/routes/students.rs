//! Student Routes

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use record_validator::StudentDraft;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{Mark, Student};

use crate::error::ServiceError;
use crate::service::ListParams;
use crate::AppState;

/// Query parameters for the list endpoint; kept as text so that
/// non-numeric values fall back to defaults instead of rejecting
#[derive(Debug, Default, Deserialize)]
pub struct StudentQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

/// Response for the list endpoint
#[derive(Debug, Serialize)]
pub struct StudentListResponse {
    pub success: bool,
    pub students: Vec<Student>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// Response for a single student with marks
#[derive(Debug, Serialize)]
pub struct StudentDetailResponse {
    pub success: bool,
    pub student: Student,
    pub marks: Vec<Mark>,
}

/// Response for create and update
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub success: bool,
    pub student: Student,
    pub message: &'static str,
}

/// Response carrying only a message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

/// List students
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StudentQuery>,
) -> Result<Json<StudentListResponse>, ServiceError> {
    let params = ListParams {
        page: query.page,
        limit: query.limit,
        search: query.search,
    };
    let page = state.service.list(&params).await?;

    Ok(Json(StudentListResponse {
        success: true,
        students: page.students,
        total: page.total,
        page: page.page,
        limit: page.limit,
        pages: page.pages,
    }))
}

/// Get a student and its marks
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StudentDetailResponse>, ServiceError> {
    let detail = state.service.get_by_id(&id).await?;

    Ok(Json(StudentDetailResponse {
        success: true,
        student: detail.student,
        marks: detail.marks,
    }))
}

/// Create a student
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentResponse>), ServiceError> {
    let Json(draft) = payload?;
    let student = state.service.create(&draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse {
            success: true,
            student,
            message: "Student created successfully",
        }),
    ))
}

/// Update a student
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<Json<StudentResponse>, ServiceError> {
    let Json(draft) = payload?;
    let student = state.service.update(&id, &draft).await?;

    Ok(Json(StudentResponse {
        success: true,
        student,
        message: "Student updated successfully",
    }))
}

/// Delete a student and its marks
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.service.delete(&id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Student and their marks deleted successfully",
    }))
}
