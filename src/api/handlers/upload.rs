use crate::AppState;
use crate::api::error::AppError;
use crate::utils::validation::{has_pptx_extension, sanitize_filename, sniff_package};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub template_id: String,
    pub filename: String,
    pub sha256: String,
    pub size: usize,
    pub slide_count: usize,
    pub layout_count: usize,
    pub message: String,
}

fn map_multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

async fn receive_template(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let original_filename = field.file_name().unwrap_or("unnamed").to_string();
        let filename = sanitize_filename(&original_filename)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let data = field.bytes().await.map_err(map_multipart_error)?;
        upload = Some((filename, data));
    }

    let (filename, data) = upload.ok_or(AppError::BadRequest("No file provided".to_string()))?;

    if !has_pptx_extension(&filename) {
        tracing::warn!("Uploaded file '{}' does not have a .pptx extension", filename);
    }
    let mime = sniff_package(&data).map_err(|e| AppError::Unprocessable(e.to_string()))?;
    tracing::debug!("Template '{}' detected as {}", filename, mime);

    let template = state.templates.ingest(filename, data).await?;

    Ok(Json(UploadResponse {
        template_id: template.id,
        filename: template.filename,
        sha256: template.sha256,
        size: template.size,
        slide_count: template.presentation.slides.len(),
        layout_count: template.presentation.template.layouts.len(),
        message: "Template uploaded".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "Template upload, one part named `file`"),
    responses(
        (status = 200, description = "Template uploaded and parsed", body = UploadResponse),
        (status = 400, description = "No file provided or invalid file name"),
        (status = 413, description = "Template exceeds the size limit"),
        (status = 422, description = "File is not a readable PPTX package")
    ),
    tag = "templates"
)]
pub async fn upload_template(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    match receive_template(&state, &mut multipart).await {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain the rest of the body so the client sees the error instead of a reset connection
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
