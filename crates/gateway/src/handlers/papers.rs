//! Saved paper handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use paperlens_common::{
    db::models::Paper,
    errors::{AppError, Result},
    export::{papers_to_csv, EXPORT_FILE_NAME},
    metrics,
    record::ExtractedRecord,
};

#[derive(Serialize)]
pub struct PapersResponse {
    pub papers: Vec<Paper>,
}

#[derive(Serialize)]
pub struct CreatePaperResponse {
    pub success: bool,
    pub paper: Paper,
}

#[derive(Serialize)]
pub struct DeletePaperResponse {
    pub success: bool,
    pub deleted: bool,
}

/// List all saved papers, newest first
pub async fn list_papers(State(state): State<AppState>) -> Result<Json<PapersResponse>> {
    let papers = state.store.list().await?;
    Ok(Json(PapersResponse { papers }))
}

/// Save a reviewed record
///
/// Takes the full record shape. Unknown keys, including any client supplied
/// `id` or `createdAt`, are ignored; missing keys take their defaults.
pub async fn create_paper(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreatePaperResponse>> {
    let body: Value = serde_json::from_slice(&body).map_err(|e| AppError::InvalidFormat {
        message: format!("Invalid paper JSON: {}", e),
    })?;
    let map = body.as_object().ok_or_else(|| AppError::Validation {
        message: "Paper must be a JSON object".to_string(),
        field: None,
    })?;

    let record = ExtractedRecord::from_json_map(map);
    let paper = state.store.create(record).await?;
    metrics::record_paper_created();

    tracing::info!(paper_id = %paper.id, title = %paper.title, "Paper saved");

    Ok(Json(CreatePaperResponse {
        success: true,
        paper,
    }))
}

/// Delete a saved paper; deleting a missing id is not an error
pub async fn delete_paper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletePaperResponse>> {
    let paper_id = Uuid::parse_str(&id).map_err(|_| AppError::InvalidFormat {
        message: format!("Invalid paper id: {}", id),
    })?;

    let deleted = state.store.delete_by_id(paper_id).await?;
    metrics::record_paper_deleted(deleted);

    tracing::info!(paper_id = %paper_id, deleted, "Paper delete requested");

    Ok(Json(DeletePaperResponse {
        success: true,
        deleted,
    }))
}

/// Download all saved papers as CSV
pub async fn export_papers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let papers = state.store.list().await?;
    let csv = papers_to_csv(&papers);

    tracing::info!(papers = papers.len(), "Papers exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        csv,
    ))
}
