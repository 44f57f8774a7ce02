//! Metadata extraction handler
//!
//! Accepts either a multipart upload with a `pdf` field or a JSON reference
//! to a remote file (`{ "fileId": "...", "source": "google-drive" }`).

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use paperlens_common::{
    errors::{AppError, Result},
    record::ExtractedRecord,
    sources::GOOGLE_DRIVE,
};

/// Multipart field carrying the document
pub const PDF_FIELD: &str = "pdf";

/// Request to extract a file held by a remote source
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractFileRequest {
    #[validate(length(min = 1, max = 512))]
    pub file_id: String,

    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    GOOGLE_DRIVE.to_string()
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub extracted: ExtractedRecord,
}

/// Extract metadata from an uploaded PDF or a remote file
pub async fn extract(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ExtractResponse>> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let limit = state.config.server.max_upload_bytes;

    let extracted = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text(), limit))?;

        let pdf = read_pdf_field(multipart, limit).await?;
        tracing::info!(bytes = pdf.len(), "PDF upload received");

        state.pipeline.extract(&pdf).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<ExtractFileRequest>::from_request(request, &state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text(), limit))?;

        body.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("fileId".to_string()),
        })?;

        tracing::info!(file_id = %body.file_id, source = %body.source, "Remote extraction requested");

        state.remote.extract_file(&body.source, &body.file_id).await?
    } else {
        return Err(AppError::MissingField {
            field: "PDF file".to_string(),
        });
    };

    Ok(Json(ExtractResponse {
        success: true,
        extracted,
    }))
}

/// Request bodies over the upload limit keep their 413; anything else is malformed input
fn body_error(status: StatusCode, message: String, limit: usize) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::InvalidFormat { message }
    }
}

/// First `pdf` field of the form; other fields are skipped
async fn read_pdf_field(mut multipart: Multipart, limit: usize) -> Result<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text(), limit))?
    {
        if field.name() == Some(PDF_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| body_error(e.status(), e.body_text(), limit));
        }
    }

    Err(AppError::MissingField {
        field: "PDF file".to_string(),
    })
}
