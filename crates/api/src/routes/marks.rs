//! Mark Routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use record_validator::MarkDraft;
use serde::Serialize;
use std::sync::Arc;
use storage::Mark;

use crate::error::ServiceError;
use crate::AppState;

/// Response for the add-mark endpoint
#[derive(Debug, Serialize)]
pub struct MarkResponse {
    pub success: bool,
    pub mark: Mark,
    pub message: &'static str,
}

/// Add a mark to a student
pub async fn add_mark(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    payload: Result<Json<MarkDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<MarkResponse>), ServiceError> {
    let Json(draft) = payload?;
    let mark = state.service.add_mark(&student_id, &draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(MarkResponse {
            success: true,
            mark,
            message: "Marks added successfully",
        }),
    ))
}
